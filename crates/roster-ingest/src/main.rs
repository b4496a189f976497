//! Roster Ingest - offline upload file checker

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roster_common::checksum::sha256_reader;
use roster_common::logging::{init_logging, LogConfig, LogLevel};
use roster_ingest::{BatchValidator, IngestError, RecordParser};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "roster-ingest")]
#[command(author, version, about = "Check employee upload files without touching a database")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate an upload file exactly as the server would
    Validate {
        /// CSV file to check
        file: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("roster-ingest")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Validate { file, delimiter } => validate(file, delimiter),
    }
}

fn validate(path: PathBuf, delimiter: char) -> Result<()> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Delimiter '{}' must be a single ASCII character", delimiter))?;

    let file =
        File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;

    let outcome = RecordParser::with_delimiter(delimiter)
        .parse(BufReader::new(file))
        .map_err(IngestError::from)
        .and_then(|rows| BatchValidator::new().validate(rows).map_err(IngestError::from));

    match outcome {
        Ok(batch) => {
            let mut file =
                File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
            let checksum = sha256_reader(&mut file)?;
            info!(
                file = %path.display(),
                records = batch.len(),
                comments = batch.comments_skipped(),
                %checksum,
                "File is valid"
            );
            Ok(())
        },
        Err(IngestError::Parse(e)) => {
            error!(file = %path.display(), line = ?e.line(), "{}", e);
            Err(anyhow::Error::new(e).context(format!("{} rejected", path.display())))
        },
        Err(IngestError::Rejected(reason)) => {
            error!(file = %path.display(), %reason, "File rejected");
            Err(anyhow::anyhow!("{} rejected: {}", path.display(), reason))
        },
    }
}
