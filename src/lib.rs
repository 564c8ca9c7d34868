//! Core library for the sheets2sheet command line application.
//!
//! The library merges several differently shaped sheets of one workbook into
//! a single wide table, one row per key. Sheet access sits behind the traits
//! in [`io`], the per-sheet row extraction lives in [`extract`], grouping by
//! key in [`aggregate`], the output layout in [`assemble`], and [`convert`]
//! ties the passes together for a [`config::ConvertConfig`].

pub mod aggregate;
pub mod assemble;
pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod io;
pub mod logging;

pub use error::{ErrorKind, Result, ToolError};
