use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use chrono::{NaiveDateTime, Timelike};

use crate::error::{Result, ToolError};
use crate::io::{SheetView, TabularSource};

/// Input workbook backed by calamine's xlsx reader. The file handle is
/// released when the source is dropped.
pub struct XlsxSource {
    workbook: Xlsx<BufReader<File>>,
    sheet_names: Vec<String>,
}

impl XlsxSource {
    pub fn open(path: &Path) -> Result<Self> {
        let workbook: Xlsx<_> = open_workbook(path)?;
        let sheet_names = workbook.sheet_names().to_vec();
        Ok(Self {
            workbook,
            sheet_names,
        })
    }
}

impl TabularSource for XlsxSource {
    type Sheet = RangeSheet;

    fn worksheet_exists(&self, name: &str) -> bool {
        self.sheet_names.iter().any(|sheet| sheet == name)
    }

    fn open_worksheet(&mut self, name: &str) -> Result<RangeSheet> {
        let range = self
            .workbook
            .worksheet_range(name)
            .ok_or_else(|| ToolError::MissingSheet {
                sheet: name.to_string(),
            })?
            .map_err(ToolError::from)?;
        Ok(RangeSheet::new(range))
    }
}

/// A worksheet's used range, addressed from A1 regardless of where the first
/// used cell sits.
pub struct RangeSheet {
    range: Range<DataType>,
    rows: u32,
    columns: u32,
}

impl RangeSheet {
    fn new(range: Range<DataType>) -> Self {
        let (rows, columns) = range
            .end()
            .map(|(row, col)| (row + 1, col + 1))
            .unwrap_or((0, 0));
        Self {
            range,
            rows,
            columns,
        }
    }
}

impl SheetView for RangeSheet {
    fn row_count(&self) -> u32 {
        self.rows
    }

    fn column_count(&self) -> u32 {
        self.columns
    }

    fn value(&self, row: u32, col: u32) -> String {
        if row == 0 || col == 0 {
            return String::new();
        }
        cell_to_string(self.range.get_value((row - 1, col - 1)))
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::DateTimeIso(value)) | Some(DataType::DurationIso(value)) => value.clone(),
        Some(value @ DataType::DateTime(_)) => value
            .as_datetime()
            .map(format_datetime)
            .unwrap_or_else(|| value.to_string()),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Dates without a time of day render as `YYYY-MM-DD`.
fn format_datetime(value: NaiveDateTime) -> String {
    if value.num_seconds_from_midnight() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_cells_render_as_dates() {
        // 44270 is 2021-03-15 in the 1900 date system; .5 is noon.
        assert_eq!(cell_to_string(Some(&DataType::DateTime(44270.0))), "2021-03-15");
        assert_eq!(
            cell_to_string(Some(&DataType::DateTime(44270.5))),
            "2021-03-15 12:00:00"
        );
        assert_eq!(
            cell_to_string(Some(&DataType::DateTimeIso("2021-03-15T08:30:00".into()))),
            "2021-03-15T08:30:00"
        );
    }

    #[test]
    fn numbers_drop_trailing_zero_fraction() {
        assert_eq!(cell_to_string(Some(&DataType::Float(2021.0))), "2021");
        assert_eq!(cell_to_string(Some(&DataType::Float(2.5))), "2.5");
        assert_eq!(cell_to_string(None), "");
    }
}
