use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::io::TabularSink;
use crate::io::memory::{SheetGrid, WorkbookBuffer};

/// Output workbook written with rust_xlsxwriter. Cells are buffered in
/// memory and serialised on [`TabularSink::save`].
pub struct XlsxSink {
    path: PathBuf,
    buffer: WorkbookBuffer,
}

impl XlsxSink {
    pub fn create(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            buffer: WorkbookBuffer::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TabularSink for XlsxSink {
    fn open_or_create_worksheet(&mut self, name: &str) -> Result<()> {
        self.buffer.open_or_create_worksheet(name)
    }

    fn write(&mut self, row: u32, col: u32, value: &str) -> Result<()> {
        self.buffer.write(row, col, value)
    }

    fn set_bold(&mut self, row: u32, col: u32) -> Result<()> {
        self.buffer.set_bold(row, col)
    }

    fn save(&mut self) -> Result<()> {
        write_workbook(&self.path, self.buffer.sheets())?;
        self.buffer.save()
    }
}

/// Writes the buffered sheets to the given path.
pub fn write_workbook(path: &Path, sheets: &[SheetGrid]) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let bold = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (&(row, col), cell) in &sheet.cells {
            let (row_idx, col_idx) = zero_based(row, col)?;
            match (cell.value.is_empty(), cell.bold) {
                (true, false) => {}
                (true, true) => {
                    worksheet.write_blank(row_idx, col_idx, &bold)?;
                }
                (false, false) => {
                    worksheet.write_string(row_idx, col_idx, &cell.value)?;
                }
                (false, true) => {
                    worksheet.write_string_with_format(row_idx, col_idx, &cell.value, &bold)?;
                }
            }
        }
        debug!(sheet = %sheet.name, cells = sheet.cells.len(), "worksheet serialised");
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn zero_based(row: u32, col: u32) -> Result<(u32, u16)> {
    let col_idx = col
        .checked_sub(1)
        .and_then(|col| u16::try_from(col).ok())
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("column {col} is out of range")))?;
    let row_idx = row
        .checked_sub(1)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("row {row} is out of range")))?;
    Ok((row_idx, col_idx))
}
