use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while a
/// conversion job loads its configuration, reads the input workbook, or
/// writes the merged output.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or removing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the JSON configuration cannot be parsed.
    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the configuration file does not exist.
    #[error("configuration file not found: {0}")]
    MissingConfig(PathBuf),

    /// Raised when a loaded configuration breaks one of its rules.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when the input workbook does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a configured sheet is absent from the input workbook.
    #[error("unable to find sheet '{sheet}'")]
    MissingSheet { sheet: String },

    /// Raised when the key column lies beyond the sheet's last column.
    #[error("unable to find key column {index} in sheet '{sheet}'")]
    MissingKeyColumn { sheet: String, index: u32 },

    /// Raised when a content column lies beyond the sheet's last column.
    #[error("unable to find column {index} in sheet '{sheet}'")]
    MissingColumn { sheet: String, index: u32 },

    /// Raised when a sheet rule does not allow at least one match per key.
    #[error("key matches for sheet '{sheet}' must be bigger than 0 (got {value})")]
    InvalidMaxMatches { sheet: String, value: i64 },

    /// Raised when a worksheet cannot hold the requested cell.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Coarse classification of [`ToolError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed configuration.
    Configuration,
    /// Input file, sheet, or column that the configuration references is absent.
    ResourceNotFound,
    /// A sheet rule holds a value the aggregation cannot honour.
    Rule,
    /// Failure raised by the filesystem or a spreadsheet backend.
    Io,
}

impl ToolError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::Json(_) | ToolError::MissingConfig(_) | ToolError::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
            ToolError::MissingInput(_)
            | ToolError::MissingSheet { .. }
            | ToolError::MissingKeyColumn { .. }
            | ToolError::MissingColumn { .. } => ErrorKind::ResourceNotFound,
            ToolError::InvalidMaxMatches { .. } => ErrorKind::Rule,
            ToolError::Io(_)
            | ToolError::ExcelWrite(_)
            | ToolError::ExcelRead(_)
            | ToolError::InvalidWorkbook(_)
            | ToolError::Logging(_) => ErrorKind::Io,
        }
    }
}
