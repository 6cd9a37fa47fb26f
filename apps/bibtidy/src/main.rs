//! bibtidy CLI
//!
//! Cleans a BibTeX file against a CASSI reference table and writes the
//! normalized result. Warnings go to the log (or stdout as JSON with
//! `--json`); fatal errors are reported once and leave no output file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};

use bibtidy_core::{run, CleanupConfig, CommentPolicy};

#[derive(Parser)]
#[command(name = "bibtidy", version, about = "Clean up a BibTeX file")]
struct Cli {
    /// CASSI reference table CSV (Abbreviation,PubTitle,CODEN)
    #[arg(long, value_name = "CSV")]
    cassi: PathBuf,

    /// Input BibTeX file
    #[arg(short, long, value_name = "BIB")]
    input: PathBuf,

    /// Output BibTeX file
    #[arg(short, long, value_name = "BIB")]
    output: PathBuf,

    /// Cleanup configuration TOML
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Emit entries sorted by cite key
    #[arg(long)]
    sort: bool,

    /// Comment placement in the output
    #[arg(long, value_enum)]
    comments: Option<CommentsArg>,

    /// Keep every field (disable field removal)
    #[arg(long)]
    keep_fields: bool,

    /// Print warnings to stdout as JSON instead of logging them
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CommentsArg {
    Inline,
    Grouped,
    Remove,
}

impl From<CommentsArg> for CommentPolicy {
    fn from(arg: CommentsArg) -> Self {
        match arg {
            CommentsArg::Inline => CommentPolicy::Inline,
            CommentsArg::Grouped => CommentPolicy::Grouped,
            CommentsArg::Remove => CommentPolicy::Remove,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match CleanupConfig::from_toml_path(path) {
            Ok(config) => config,
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => CleanupConfig::default(),
    };

    // Flags override the config file
    if cli.sort {
        config.sort_by_key = true;
    }
    if let Some(comments) = cli.comments {
        config.comments = comments.into();
    }
    if cli.keep_fields {
        config.remove_enabled = false;
    }

    let report = match run(&config, &cli.cassi, &cli.input, &cli.output) {
        Ok(report) => report,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report.warnings) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!("failed to render warnings as JSON: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for warning in &report.warnings {
            warn!("{warning}");
        }
    }

    info!(
        entries = report.entry_count,
        warnings = report.warnings.len(),
        "wrote {}",
        cli.output.display()
    );
    ExitCode::SUCCESS
}
