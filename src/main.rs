use std::path::PathBuf;

use clap::Parser;
use sheets2sheet::{convert, logging};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = logging::init(&cli.log_level) {
        eprintln!("warning: {error}");
    }

    match convert::convert_file(&cli.config) {
        Ok(summary) => {
            println!(
                "conversion completed: {} keys, {} columns per row, saved to {}",
                summary.keys,
                summary.columns,
                summary.output.display()
            );
        }
        Err(error) => {
            println!("error: {error}");
            std::process::exit(1);
        }
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge the sheets of a workbook into one table keyed by a shared column."
)]
struct Cli {
    /// JSON file describing the input, the output and the sheet rules.
    config: PathBuf,

    /// Log filter directive (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,
}
