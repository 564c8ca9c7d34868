//! Lays the aggregated content out as one wide row per key.
//!
//! Row 1 carries the labels: the key column label in column 1, then each
//! sheet rule's header repeated once per match group across its slot. Every
//! following row holds a key and, per rule, the key's matched lines spread
//! over a slot of fixed width so all rows have the same number of columns.

use tracing::{debug, instrument, warn};

use crate::aggregate::{Aggregation, KeyEntry};
use crate::config::SheetRule;
use crate::error::Result;
use crate::io::TabularSink;

const HEADER_ROW: u32 = 1;
const KEY_COLUMN: u32 = 1;

/// Shape of the written table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Data rows written below the header row.
    pub rows: usize,
    /// Columns per row, key column included.
    pub columns: usize,
}

/// Column block reserved for one sheet rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLayout<'a> {
    rule: &'a SheetRule,
    matches: usize,
    width: usize,
}

impl<'a> SlotLayout<'a> {
    /// Sizes the slot as the number of cells a fully matched key produces:
    /// `MaxMatchs` lines of the rule's columns, joined by the line delimiter
    /// and split on the column delimiter.
    pub fn new(rule: &'a SheetRule) -> Result<Self> {
        let matches = rule.max_matches()?;
        let template_line =
            vec![""; rule.column_indexes.len()].join(rule.columns_delimiter.as_str());
        let width = spread(&vec![template_line; matches], rule).len();
        Ok(Self {
            rule,
            matches,
            width,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cells for a key's lines, padded with empty cells or truncated to the
    /// slot width.
    pub fn content_cells(&self, lines: &[String]) -> Vec<String> {
        self.fit(spread(lines, self.rule))
    }

    /// Number of cells `content_cells` drops for these lines. Non-zero when a
    /// value contains the column delimiter.
    pub fn overflow(&self, lines: &[String]) -> usize {
        spread(lines, self.rule).len().saturating_sub(self.width)
    }

    /// Cells for the header row: the header line once per match group.
    pub fn header_cells(&self, header: &str) -> Vec<String> {
        let repeated = vec![header.to_string(); self.matches];
        self.fit(spread(&repeated, self.rule))
    }

    fn fit(&self, mut cells: Vec<String>) -> Vec<String> {
        cells.resize(self.width, String::new());
        cells
    }
}

fn spread(lines: &[String], rule: &SheetRule) -> Vec<String> {
    lines
        .join(rule.lines_delimiter.as_str())
        .split(rule.columns_delimiter.as_str())
        .map(str::to_string)
        .collect()
}

/// Writes the aggregation into `sheet_name` of `sink` and saves the sink.
///
/// The sink is saved even when a write fails; the write error is returned in
/// that case.
#[instrument(level = "info", skip(aggregation, rules, sink), fields(keys = aggregation.store.len()))]
pub fn export<K: TabularSink>(
    aggregation: &Aggregation,
    rules: &[SheetRule],
    sheet_name: &str,
    sink: &mut K,
) -> Result<ExportSummary> {
    let written = write_table(aggregation, rules, sheet_name, sink);
    let saved = sink.save();
    let summary = written?;
    saved?;
    debug!(rows = summary.rows, columns = summary.columns, "output saved");
    Ok(summary)
}

fn write_table<K: TabularSink>(
    aggregation: &Aggregation,
    rules: &[SheetRule],
    sheet_name: &str,
    sink: &mut K,
) -> Result<ExportSummary> {
    let slots = rules
        .iter()
        .map(SlotLayout::new)
        .collect::<Result<Vec<_>>>()?;

    sink.open_or_create_worksheet(sheet_name)?;

    let key_label = aggregation.key_label.as_deref().unwrap_or_default();
    sink.write(HEADER_ROW, KEY_COLUMN, key_label)?;
    sink.set_bold(HEADER_ROW, KEY_COLUMN)?;

    let mut first_col = KEY_COLUMN + 1;
    for slot in &slots {
        if let Some(header) = aggregation.headers.get(&slot.rule.sheet_name) {
            write_cells(sink, HEADER_ROW, first_col, &slot.header_cells(header), true)?;
        }
        first_col += slot.width() as u32;
    }

    let mut row = HEADER_ROW;
    for entry in aggregation.store.iter() {
        row += 1;
        write_key_row(sink, row, entry, &slots)?;
    }

    Ok(ExportSummary {
        rows: aggregation.store.len(),
        columns: 1 + slots.iter().map(SlotLayout::width).sum::<usize>(),
    })
}

fn write_key_row<K: TabularSink>(
    sink: &mut K,
    row: u32,
    entry: &KeyEntry,
    slots: &[SlotLayout<'_>],
) -> Result<()> {
    sink.write(row, KEY_COLUMN, entry.key())?;

    let mut first_col = KEY_COLUMN + 1;
    for slot in slots {
        let lines = entry.lines(&slot.rule.sheet_name);
        let dropped = slot.overflow(lines);
        if dropped > 0 {
            warn!(
                sheet = %slot.rule.sheet_name,
                key = entry.key(),
                dropped,
                "content does not fit its slot; trailing cells dropped"
            );
        }
        let cells = slot.content_cells(lines);
        write_cells(sink, row, first_col, &cells, false)?;
        first_col += slot.width() as u32;
    }
    Ok(())
}

fn write_cells<K: TabularSink>(
    sink: &mut K,
    row: u32,
    first_col: u32,
    cells: &[String],
    bold: bool,
) -> Result<()> {
    for (offset, value) in cells.iter().enumerate() {
        let col = first_col + offset as u32;
        sink.write(row, col, value)?;
        if bold {
            sink.set_bold(row, col)?;
        }
    }
    Ok(())
}
