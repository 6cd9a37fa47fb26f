//! End-to-end cleanup run
//!
//! Validate the configuration, load the reference table, parse the input,
//! transform, serialize, write. Every failure here is fatal and happens
//! before the output file exists; resolution misses are not failures and
//! come back as warnings in the report.

use std::path::Path;

use bibtidy_bibtex::{format_file, parse, ParseError};
use bibtidy_cassi::{CassiTable, TableError};
use tracing::debug;

use crate::config::{CleanupConfig, ConfigError};
use crate::transform::transform_entries;
use crate::warning::Warning;

/// Fatal pipeline failure
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("malformed BibTeX at line {line}: {message}")]
    Malformed { line: u32, message: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Result of cleaning one document in memory
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub text: String,
    pub warnings: Vec<Warning>,
    pub entry_count: usize,
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub entry_count: usize,
    pub warnings: Vec<Warning>,
}

/// Clean a BibTeX document held in memory
pub fn clean_text(
    text: &str,
    table: &CassiTable,
    config: &CleanupConfig,
) -> Result<CleanOutcome, PipelineError> {
    let parsed = parse(text)?;
    if let Some(issue) = parsed.issues.first() {
        return Err(PipelineError::Malformed {
            line: issue.line,
            message: issue.message.clone(),
        });
    }

    let mut entries = parsed.entries;
    debug!(entries = entries.len(), "transforming records");
    let warnings = transform_entries(&mut entries, table, config);

    let text = format_file(&entries, &parsed.trailing_comments, &config.write_options());
    Ok(CleanOutcome {
        text,
        entry_count: entries.len(),
        warnings,
    })
}

/// Run the whole pipeline against files on disk
pub fn run(
    config: &CleanupConfig,
    table_path: &Path,
    input_path: &Path,
    output_path: &Path,
) -> Result<RunReport, PipelineError> {
    config.validate()?;

    let table = CassiTable::from_csv_path(table_path)?;
    debug!(rows = table.len(), table = %table_path.display(), "reference table loaded");

    let text = std::fs::read_to_string(input_path).map_err(|source| PipelineError::Read {
        path: input_path.display().to_string(),
        source,
    })?;

    let outcome = clean_text(&text, &table, config)?;

    std::fs::write(output_path, &outcome.text).map_err(|source| PipelineError::Write {
        path: output_path.display().to_string(),
        source,
    })?;
    debug!(
        entries = outcome.entry_count,
        warnings = outcome.warnings.len(),
        output = %output_path.display(),
        "cleaned file written"
    );

    Ok(RunReport {
        entry_count: outcome.entry_count,
        warnings: outcome.warnings,
    })
}
