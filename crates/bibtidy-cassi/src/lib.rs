//! CASSI journal abbreviation table
//!
//! CSV-backed mapping from full publication names (and CODEN codes) to
//! standardized journal abbreviations.

mod table;

pub use table::{normalize_name, CassiEntry, CassiTable, TableError};
