//! Structured normalization warnings
//!
//! The transform pass returns these instead of printing; the caller decides
//! how to render them (console, log, JSON).

use serde::Serialize;
use std::fmt;

/// A non-fatal problem found while normalizing one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Journal name absent from the reference table; field left unchanged
    UnknownJournal { cite_key: String, journal: String },
    /// DOI does not start with `10`
    SuspiciousDoi { cite_key: String, doi: String },
    /// Entry has no DOI field at all
    MissingDoi { cite_key: String },
    /// Author list ends in `and others`
    IncompleteAuthors { cite_key: String },
}

impl Warning {
    pub fn cite_key(&self) -> &str {
        match self {
            Warning::UnknownJournal { cite_key, .. }
            | Warning::SuspiciousDoi { cite_key, .. }
            | Warning::MissingDoi { cite_key }
            | Warning::IncompleteAuthors { cite_key } => cite_key,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownJournal { cite_key, journal } => write!(
                f,
                "unknown journal abbreviation for '{journal}' in entry {cite_key}; check CASSI directly"
            ),
            Warning::SuspiciousDoi { cite_key, doi } => write!(
                f,
                "DOI '{doi}' in entry {cite_key} does not start with '10.'; please confirm it"
            ),
            Warning::MissingDoi { cite_key } => {
                write!(f, "entry {cite_key} has no DOI field")
            }
            Warning::IncompleteAuthors { cite_key } => write!(
                f,
                "author list for entry {cite_key} may be incomplete ('and others')"
            ),
        }
    }
}
