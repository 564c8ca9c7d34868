use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::aggregate::Aggregation;
use crate::assemble;
use crate::config::ConvertConfig;
use crate::error::{Result, ToolError};
use crate::io::excel_read::XlsxSource;
use crate::io::excel_write::XlsxSink;

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Distinct keys written, one output row each.
    pub keys: usize,
    /// Columns per output row, key column included.
    pub columns: usize,
    /// Workbook the merged table was saved to.
    pub output: PathBuf,
}

/// Loads the JSON configuration at `config_path` and runs the conversion it
/// describes.
#[instrument(level = "info", skip_all, fields(config = %config_path.display()))]
pub fn convert_file(config_path: &Path) -> Result<ConversionSummary> {
    let config = ConvertConfig::from_file(config_path)?;
    debug!(rules = config.sheet_records.len(), "configuration loaded");
    convert(&config)
}

/// Merges the configured input sheets into the output workbook.
///
/// An existing output file is removed before the input is read, so a failed
/// run never leaves stale content behind.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %config.input_file.display(), output = %config.output_file.display())
)]
pub fn convert(config: &ConvertConfig) -> Result<ConversionSummary> {
    config.validate()?;
    if !config.input_file.is_file() {
        return Err(ToolError::MissingInput(config.input_file.clone()));
    }
    remove_stale_output(&config.output_file)?;

    let aggregation = {
        let mut source = XlsxSource::open(&config.input_file)?;
        Aggregation::collect(&mut source, &config.sheet_records)?
    };

    let mut sink = XlsxSink::create(&config.output_file);
    let summary = assemble::export(
        &aggregation,
        &config.sheet_records,
        &config.output_sheet_name,
        &mut sink,
    )?;
    info!(
        keys = summary.rows,
        columns = summary.columns,
        output = %sink.path().display(),
        "conversion complete"
    );
    Ok(ConversionSummary {
        keys: summary.rows,
        columns: summary.columns,
        output: sink.path().to_path_buf(),
    })
}

fn remove_stale_output(path: &Path) -> Result<()> {
    if path.exists() {
        debug!(path = %path.display(), "removing existing output");
        fs::remove_file(path)?;
    }
    Ok(())
}
