use std::collections::BTreeMap;

use crate::error::{Result, ToolError};
use crate::io::{SheetView, TabularSink, TabularSource};

/// Worksheet held entirely in memory as rows of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySheet {
    rows: Vec<Vec<String>>,
}

impl MemorySheet {
    pub fn new<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }
}

impl SheetView for MemorySheet {
    fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    fn column_count(&self) -> u32 {
        self.rows.iter().map(Vec::len).max().unwrap_or(0) as u32
    }

    fn value(&self, row: u32, col: u32) -> String {
        if row == 0 || col == 0 {
            return String::new();
        }
        self.rows
            .get(row as usize - 1)
            .and_then(|cells| cells.get(col as usize - 1))
            .cloned()
            .unwrap_or_default()
    }
}

/// Workbook of named [`MemorySheet`]s.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheets: Vec<(String, MemorySheet)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, sheet: MemorySheet) -> Self {
        self.sheets.push((name.into(), sheet));
        self
    }
}

impl TabularSource for MemorySource {
    type Sheet = MemorySheet;

    fn worksheet_exists(&self, name: &str) -> bool {
        self.sheets.iter().any(|(sheet_name, _)| sheet_name == name)
    }

    fn open_worksheet(&mut self, name: &str) -> Result<MemorySheet> {
        self.sheets
            .iter()
            .find(|(sheet_name, _)| sheet_name == name)
            .map(|(_, sheet)| sheet.clone())
            .ok_or_else(|| ToolError::MissingSheet {
                sheet: name.to_string(),
            })
    }
}

/// A single written cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellData {
    pub value: String,
    pub bold: bool,
}

/// Sparse grid of written cells, keyed by 1-based `(row, col)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    pub cells: BTreeMap<(u32, u32), CellData>,
}

impl SheetGrid {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
        }
    }

    /// Text at the given cell, empty when nothing was written there.
    pub fn value(&self, row: u32, col: u32) -> &str {
        self.cells
            .get(&(row, col))
            .map(|cell| cell.value.as_str())
            .unwrap_or("")
    }

    pub fn is_bold(&self, row: u32, col: u32) -> bool {
        self.cells.get(&(row, col)).is_some_and(|cell| cell.bold)
    }

    /// Highest row that received a cell.
    pub fn last_row(&self) -> u32 {
        self.cells.keys().map(|(row, _)| *row).max().unwrap_or(0)
    }

    /// Highest column written in the given row.
    pub fn row_width(&self, row: u32) -> u32 {
        self.cells
            .range((row, 0)..=(row, u32::MAX))
            .map(|((_, col), _)| *col)
            .max()
            .unwrap_or(0)
    }
}

/// In-memory [`TabularSink`]. The xlsx writer buffers into one of these
/// before serialising.
#[derive(Debug, Clone, Default)]
pub struct WorkbookBuffer {
    sheets: Vec<SheetGrid>,
    active: Option<usize>,
    saved: bool,
}

impl WorkbookBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[SheetGrid] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetGrid> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    fn active_cell(&mut self, row: u32, col: u32) -> Result<&mut CellData> {
        if row == 0 || col == 0 {
            return Err(ToolError::InvalidWorkbook(format!(
                "cell ({row}, {col}) is outside the 1-based grid"
            )));
        }
        let index = self
            .active
            .ok_or_else(|| ToolError::InvalidWorkbook("no worksheet selected".into()))?;
        Ok(self.sheets[index].cells.entry((row, col)).or_default())
    }
}

impl TabularSink for WorkbookBuffer {
    fn open_or_create_worksheet(&mut self, name: &str) -> Result<()> {
        let index = match self.sheets.iter().position(|sheet| sheet.name == name) {
            Some(index) => index,
            None => {
                self.sheets.push(SheetGrid::new(name));
                self.sheets.len() - 1
            }
        };
        self.active = Some(index);
        Ok(())
    }

    fn write(&mut self, row: u32, col: u32, value: &str) -> Result<()> {
        self.active_cell(row, col)?.value = value.to_string();
        Ok(())
    }

    fn set_bold(&mut self, row: u32, col: u32) -> Result<()> {
        self.active_cell(row, col)?.bold = true;
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        self.saved = true;
        Ok(())
    }
}
