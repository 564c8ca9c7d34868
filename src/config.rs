use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// Delimiter used when a sheet rule does not name one.
pub const DEFAULT_DELIMITER: &str = "\t";

/// Describes a full conversion job: where to read, where to write, and how
/// each source sheet contributes to the merged output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConvertConfig {
    /// Workbook holding the source sheets.
    pub input_file: PathBuf,
    /// Workbook the merged table is written to. Replaced when it exists.
    pub output_file: PathBuf,
    /// Name of the single sheet created in the output workbook.
    pub output_sheet_name: String,
    /// Sheet rules, in the order their slots appear in the output.
    #[serde(default)]
    pub sheet_records: Vec<SheetRule>,
}

/// Extraction rule for one source sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SheetRule {
    pub sheet_name: String,
    /// 1-based column holding the grouping key.
    pub key_index: u32,
    /// 1-based columns concatenated into each content line.
    #[serde(default)]
    pub column_indexes: Vec<u32>,
    /// Whether row 1 holds column labels rather than data.
    #[serde(default)]
    pub contains_header: bool,
    #[serde(default = "default_delimiter")]
    pub columns_delimiter: String,
    #[serde(default = "default_delimiter")]
    pub lines_delimiter: String,
    /// Maximum number of rows kept per key. Kept signed so that
    /// non-positive values reach [`SheetRule::max_matches`] and are reported.
    #[serde(rename = "MaxMatchs")]
    pub max_matches: i64,
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

impl ConvertConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ToolError::MissingConfig(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Checks the parts of the configuration that do not depend on the
    /// input workbook.
    pub fn validate(&self) -> Result<()> {
        if self.output_sheet_name.trim().is_empty() {
            return Err(ToolError::InvalidConfig(
                "output sheet name must be filled out".into(),
            ));
        }
        for rule in &self.sheet_records {
            rule.validate()?;
        }
        Ok(())
    }
}

impl SheetRule {
    /// Creates a rule with tab delimiters, no header row and a single match
    /// per key.
    pub fn new(sheet_name: impl Into<String>, key_index: u32, column_indexes: Vec<u32>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            key_index,
            column_indexes,
            contains_header: false,
            columns_delimiter: default_delimiter(),
            lines_delimiter: default_delimiter(),
            max_matches: 1,
        }
    }

    pub fn with_header(mut self, contains_header: bool) -> Self {
        self.contains_header = contains_header;
        self
    }

    pub fn with_delimiters(mut self, columns: impl Into<String>, lines: impl Into<String>) -> Self {
        self.columns_delimiter = columns.into();
        self.lines_delimiter = lines.into();
        self
    }

    pub fn with_max_matches(mut self, max_matches: i64) -> Self {
        self.max_matches = max_matches;
        self
    }

    /// Returns the per-key cap, rejecting values below one.
    pub fn max_matches(&self) -> Result<usize> {
        usize::try_from(self.max_matches)
            .ok()
            .filter(|cap| *cap > 0)
            .ok_or_else(|| ToolError::InvalidMaxMatches {
                sheet: self.sheet_name.clone(),
                value: self.max_matches,
            })
    }

    fn validate(&self) -> Result<()> {
        if self.columns_delimiter.is_empty() || self.lines_delimiter.is_empty() {
            return Err(ToolError::InvalidConfig(format!(
                "delimiters of sheet '{}' must not be empty",
                self.sheet_name
            )));
        }
        if self.key_index == 0 || self.column_indexes.contains(&0) {
            return Err(ToolError::InvalidConfig(format!(
                "column indexes of sheet '{}' are 1-based",
                self.sheet_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_original_field_names_and_defaults() {
        let json = r#"{
            "InputFile": "in.xlsx",
            "OutputFile": "out.xlsx",
            "OutputSheetName": "Merged",
            "SheetRecords": [
                {
                    "SheetName": "Docs",
                    "KeyIndex": 1,
                    "ColumnIndexes": [2, 3],
                    "ContainsHeader": true,
                    "ColumnsDelimiter": ";",
                    "LinesDelimiter": "\n",
                    "MaxMatchs": 3
                },
                { "SheetName": "Notes", "KeyIndex": 2, "MaxMatchs": 1 }
            ]
        }"#;

        let config: ConvertConfig = serde_json::from_str(json).expect("config parsed");

        assert_eq!(config.output_sheet_name, "Merged");
        assert_eq!(config.sheet_records.len(), 2);
        let docs = &config.sheet_records[0];
        assert_eq!(docs.column_indexes, vec![2, 3]);
        assert_eq!(docs.lines_delimiter, "\n");
        assert_eq!(docs.max_matches().expect("cap"), 3);
        let notes = &config.sheet_records[1];
        assert!(!notes.contains_header);
        assert!(notes.column_indexes.is_empty());
        assert_eq!(notes.columns_delimiter, "\t");
        assert_eq!(notes.lines_delimiter, "\t");
    }

    #[test]
    fn non_positive_cap_is_a_rule_error() {
        for value in [0, -2] {
            let rule = SheetRule::new("Docs", 1, vec![2]).with_max_matches(value);
            let error = rule.max_matches().expect_err("cap rejected");
            assert_eq!(error.kind(), ErrorKind::Rule);
            assert!(error.to_string().contains("Docs"));
        }
    }

    #[test]
    fn validate_rejects_blank_output_sheet() {
        let config = ConvertConfig {
            input_file: "in.xlsx".into(),
            output_file: "out.xlsx".into(),
            output_sheet_name: "  ".into(),
            sheet_records: vec![],
        };

        let error = config.validate().expect_err("blank sheet name rejected");
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn validate_rejects_zero_index_and_empty_delimiter() {
        let mut config = ConvertConfig {
            input_file: "in.xlsx".into(),
            output_file: "out.xlsx".into(),
            output_sheet_name: "Merged".into(),
            sheet_records: vec![SheetRule::new("Docs", 1, vec![0])],
        };
        assert!(matches!(config.validate(), Err(ToolError::InvalidConfig(_))));

        config.sheet_records = vec![SheetRule::new("Docs", 1, vec![2]).with_delimiters("", "\t")];
        assert!(matches!(config.validate(), Err(ToolError::InvalidConfig(_))));
    }

    #[test]
    fn missing_file_is_reported() {
        let error = ConvertConfig::from_file(Path::new("/definitely/not/here.json"))
            .expect_err("missing config");
        assert!(matches!(error, ToolError::MissingConfig(_)));
    }
}
