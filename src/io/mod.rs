//! Tabular source and sink abstractions plus their xlsx and in-memory
//! implementations. Rows and columns are 1-based at this boundary.

pub mod excel_read;
pub mod excel_write;
pub mod memory;

use crate::error::Result;

/// Read access to one worksheet.
pub trait SheetView {
    /// Number of rows, counted from row 1 to the last used row.
    fn row_count(&self) -> u32;
    /// Number of columns, counted from column 1 to the last used column.
    fn column_count(&self) -> u32;
    /// Cell text at the given position; empty when the cell holds nothing.
    fn value(&self, row: u32, col: u32) -> String;
}

/// Workbook the aggregation pass reads from.
pub trait TabularSource {
    type Sheet: SheetView;

    fn worksheet_exists(&self, name: &str) -> bool;

    fn open_worksheet(&mut self, name: &str) -> Result<Self::Sheet>;
}

/// Workbook the assembler writes into. Writes target the worksheet most
/// recently selected with [`TabularSink::open_or_create_worksheet`].
pub trait TabularSink {
    fn open_or_create_worksheet(&mut self, name: &str) -> Result<()>;

    fn write(&mut self, row: u32, col: u32, value: &str) -> Result<()>;

    fn set_bold(&mut self, row: u32, col: u32) -> Result<()>;

    /// Persists everything written so far.
    fn save(&mut self) -> Result<()>;
}
