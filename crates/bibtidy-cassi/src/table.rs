//! CASSI reference table
//!
//! Loads the `Abbreviation,PubTitle,CODEN` CSV and answers abbreviation
//! lookups. Matching is exact after name normalization (trim, collapse
//! internal whitespace, lowercase); no substring matching, so similarly
//! named journals cannot shadow each other. CODEN codes act as an
//! alternate lookup key.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One row of the reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CassiEntry {
    pub full_name: String,
    pub abbreviation: String,
    pub coden: Option<String>,
}

/// Errors raised while loading the table; all fatal
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("reference table not found: {0}")]
    FileNotFound(String),

    #[error("failed to read reference table {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("reference table is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("malformed reference table: {0}")]
    Csv(#[from] csv::Error),
}

/// In-memory abbreviation table with normalized-name and CODEN indexes
#[derive(Debug, Clone, Default)]
pub struct CassiTable {
    entries: Vec<CassiEntry>,
    by_name: HashMap<String, usize>,
    by_coden: HashMap<String, usize>,
}

impl CassiTable {
    /// Load the table from a CSV file with an `Abbreviation,PubTitle,CODEN`
    /// header row (the CODEN column may be absent)
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TableError::FileNotFound(path.display().to_string()));
        }
        let file = File::open(path).map_err(|source| TableError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Load the table from any CSV source
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &'static str| -> Result<usize, TableError> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(TableError::MissingColumn(name))
        };
        let abbrev_col = column("Abbreviation")?;
        let title_col = column("PubTitle")?;
        let coden_col = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("CODEN"));

        let mut table = Self::default();
        for record in csv_reader.records() {
            let record = record?;
            let full_name = record.get(title_col).unwrap_or_default();
            let abbreviation = record.get(abbrev_col).unwrap_or_default();
            if full_name.is_empty() || abbreviation.is_empty() {
                continue;
            }
            let coden = coden_col
                .and_then(|i| record.get(i))
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            table.insert(CassiEntry {
                full_name: full_name.to_string(),
                abbreviation: abbreviation.to_string(),
                coden,
            });
        }

        Ok(table)
    }

    /// Add one row; the first row loaded for a given name or CODEN wins
    pub fn insert(&mut self, entry: CassiEntry) {
        let index = self.entries.len();
        self.by_name
            .entry(normalize_name(&entry.full_name))
            .or_insert(index);
        if let Some(coden) = &entry.coden {
            self.by_coden.entry(coden.to_uppercase()).or_insert(index);
        }
        self.entries.push(entry);
    }

    /// Look up the abbreviation for a journal name or CODEN code.
    /// `None` is the not-found signal; the caller decides how to degrade.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        if let Some(&index) = self.by_name.get(&normalize_name(name)) {
            return Some(&self.entries[index].abbreviation);
        }
        self.by_coden
            .get(&name.trim().to_uppercase())
            .map(|&index| self.entries[index].abbreviation.as_str())
    }

    /// Whether a value already is one of the table's abbreviations
    pub fn is_abbreviation(&self, value: &str) -> bool {
        let value = value.trim();
        self.entries.iter().any(|e| e.abbreviation == value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trim, collapse internal whitespace runs, lowercase
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
