//! Walks one source sheet according to its [`SheetRule`] and turns each row
//! into a `(key, content line)` pair.

use tracing::trace;

use crate::config::SheetRule;
use crate::error::{Result, ToolError};
use crate::io::SheetView;

/// Content collected from one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRow {
    pub key: String,
    pub line: String,
}

/// Everything the aggregation pass needs from one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSheet {
    /// Rows with a non-empty content line, in sheet order.
    pub rows: Vec<ExtractedRow>,
    /// Labels for the rule's content columns joined by its column delimiter.
    /// Taken from row 1 when the sheet has a header, synthesised otherwise.
    pub header: Option<String>,
    /// Key column value of the header row.
    pub key_label: Option<String>,
}

/// Extracts the rows of `sheet` selected by `rule`.
///
/// Column indexes are checked against the sheet's column count on every row
/// before any value is read, so an out-of-range index fails the sheet on the
/// first row. A sheet without rows is never checked.
pub fn extract_sheet<S: SheetView>(rule: &SheetRule, sheet: &S) -> Result<ExtractedSheet> {
    let mut extracted = ExtractedSheet::default();
    let row_count = sheet.row_count();
    let column_count = sheet.column_count();

    for row in 1..=row_count {
        if rule.key_index > column_count {
            return Err(ToolError::MissingKeyColumn {
                sheet: rule.sheet_name.clone(),
                index: rule.key_index,
            });
        }

        let is_header_row = row == 1 && rule.contains_header;
        let mut labels: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::with_capacity(rule.column_indexes.len());

        for &col in &rule.column_indexes {
            if col > column_count {
                return Err(ToolError::MissingColumn {
                    sheet: rule.sheet_name.clone(),
                    index: col,
                });
            }

            let value = sheet.value(row, col);
            if is_header_row {
                labels.push(value);
                continue;
            }
            if row == 1 {
                labels.push(synthetic_label(&rule.sheet_name, col));
            }
            values.push(value);
        }

        let key = sheet.value(row, rule.key_index);
        if is_header_row {
            extracted.key_label = Some(key.clone());
        }

        if row == 1 && !labels.is_empty() {
            extracted.header = Some(labels.join(rule.columns_delimiter.as_str()));
        }

        let line = values.join(rule.columns_delimiter.as_str());
        if line.is_empty() {
            trace!(sheet = %rule.sheet_name, row, "skipping row without content");
            continue;
        }
        extracted.rows.push(ExtractedRow { key, line });
    }

    Ok(extracted)
}

fn synthetic_label(sheet_name: &str, col: u32) -> String {
    format!("SHEET: {sheet_name}, COLUMN: {col}")
}
