//! Groups extracted content lines by key across all configured sheets.

use std::collections::HashMap;

use tracing::{debug, info, instrument};

use crate::config::SheetRule;
use crate::error::{Result, ToolError};
use crate::extract::extract_sheet;
use crate::io::TabularSource;

/// Content collected for one key, per sheet name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    key: String,
    sheets: HashMap<String, Vec<String>>,
}

impl KeyEntry {
    fn new(key: String) -> Self {
        Self {
            key,
            sheets: HashMap::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Lines recorded for `sheet_name`, in match order. Empty when the sheet
    /// never matched this key.
    pub fn lines(&self, sheet_name: &str) -> &[String] {
        self.sheets
            .get(sheet_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Key → sheet → lines mapping that iterates keys in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct AggregationStore {
    positions: HashMap<String, usize>,
    entries: Vec<KeyEntry>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `line` to the key's list for `sheet_name` unless that list
    /// already holds `max_matches` lines. Returns whether the line was kept.
    pub fn record(&mut self, key: &str, sheet_name: &str, line: String, max_matches: usize) -> bool {
        let position = match self.positions.get(key) {
            Some(&position) => position,
            None => {
                self.entries.push(KeyEntry::new(key.to_string()));
                let position = self.entries.len() - 1;
                self.positions.insert(key.to_string(), position);
                position
            }
        };

        let lines = self.entries[position]
            .sheets
            .entry(sheet_name.to_string())
            .or_default();
        if lines.len() < max_matches.max(1) {
            lines.push(line);
            true
        } else {
            false
        }
    }

    pub fn get(&self, key: &str) -> Option<&KeyEntry> {
        self.positions.get(key).map(|&position| &self.entries[position])
    }

    /// Entries in the order their keys were first recorded.
    pub fn iter(&self) -> impl Iterator<Item = &KeyEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Header line per sheet name. The first registration for a sheet wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderRegistry {
    headers: HashMap<String, String>,
}

impl HeaderRegistry {
    pub fn register(&mut self, sheet_name: &str, header: String) {
        self.headers.entry(sheet_name.to_string()).or_insert(header);
    }

    pub fn get(&self, sheet_name: &str) -> Option<&str> {
        self.headers.get(sheet_name).map(String::as_str)
    }
}

/// Result of the load pass over every sheet rule.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub store: AggregationStore,
    pub headers: HeaderRegistry,
    /// Label for the output's key column, taken from the first header row
    /// that has one.
    pub key_label: Option<String>,
}

impl Aggregation {
    /// Reads every rule's sheet from `source`, in rule order.
    ///
    /// Each rule is checked before its sheet is read: the sheet must exist
    /// and its cap must be positive. The first failure aborts the pass.
    #[instrument(level = "info", skip_all, fields(rules = rules.len()))]
    pub fn collect<S: TabularSource>(source: &mut S, rules: &[SheetRule]) -> Result<Self> {
        let mut aggregation = Aggregation::default();

        for rule in rules {
            if !source.worksheet_exists(&rule.sheet_name) {
                return Err(ToolError::MissingSheet {
                    sheet: rule.sheet_name.clone(),
                });
            }
            let max_matches = rule.max_matches()?;

            let sheet = source.open_worksheet(&rule.sheet_name)?;
            let extracted = extract_sheet(rule, &sheet)?;

            if let Some(header) = extracted.header {
                aggregation.headers.register(&rule.sheet_name, header);
            }
            if aggregation.key_label.is_none() {
                aggregation.key_label = extracted.key_label.filter(|label| !label.is_empty());
            }

            let mut dropped = 0usize;
            let row_count = extracted.rows.len();
            for row in extracted.rows {
                if !aggregation
                    .store
                    .record(&row.key, &rule.sheet_name, row.line, max_matches)
                {
                    dropped += 1;
                }
            }
            debug!(
                sheet = %rule.sheet_name,
                rows = row_count,
                dropped,
                "sheet aggregated"
            );
        }

        info!(keys = aggregation.store.len(), "aggregation complete");
        Ok(aggregation)
    }
}
