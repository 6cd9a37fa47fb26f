//! Normalization pipeline for BibTeX bibliographies
//!
//! - Journal names rewritten to CASSI abbreviations (warning on misses)
//! - Titles re-cased with configurable word overrides
//! - DOI, page-range, and author-list cleanup
//! - Field removal, field ordering, comment placement
//!
//! The transform is a single synchronous pass over an in-memory entry
//! collection; each entry is handled independently.

pub mod config;
pub mod pipeline;
pub mod titlecase;
pub mod transform;
pub mod warning;

pub use config::{CleanupConfig, ConfigError};
pub use pipeline::{clean_text, run, CleanOutcome, PipelineError, RunReport};
pub use titlecase::{normalize_title, WordOverrides};
pub use transform::transform_entries;
pub use warning::Warning;

// Re-exported so downstream callers can name the serialization options
pub use bibtidy_bibtex::{CommentPolicy, WriteOptions};
