//! BibTeX serialization
//!
//! Renders entries back to BibTeX text with a configurable field order,
//! comment placement policy, and optional alphabetical entry ordering.
//! Output is deterministic: the same entries and options always produce
//! byte-identical text.

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, Field};

/// Where comments end up in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentPolicy {
    /// Keep each entry's comments immediately before it
    Inline,
    /// Collect every comment into one block before the first entry
    Grouped,
    /// Drop all comments
    Remove,
}

/// Serialization options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Fields emitted first, in this order; the rest follow alphabetically
    pub field_order: Vec<String>,
    pub comments: CommentPolicy,
    /// Sort entries by cite key (codepoint order) instead of input order
    pub sort_by_key: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            field_order: Vec::new(),
            comments: CommentPolicy::Inline,
            sort_by_key: false,
        }
    }
}

/// Format a single entry, fields ordered per `options.field_order`
pub fn format_entry(entry: &Entry, options: &WriteOptions) -> String {
    let mut out = String::new();
    out.push('@');
    out.push_str(&entry.entry_type);
    out.push('{');
    out.push_str(&entry.cite_key);
    out.push_str(",\n");

    for field in ordered_fields(entry, &options.field_order) {
        out.push_str("  ");
        out.push_str(&field.key);
        out.push_str(" = ");
        out.push_str(&format_value(&field.value));
        out.push_str(",\n");
    }

    out.push('}');
    out
}

/// Format a collection of entries
pub fn format_entries(entries: &[Entry], options: &WriteOptions) -> String {
    format_file(entries, &[], options)
}

/// Format a whole file, including comments left over after the last entry
pub fn format_file(entries: &[Entry], trailing_comments: &[String], options: &WriteOptions) -> String {
    let mut ordered: Vec<&Entry> = entries.iter().collect();
    if options.sort_by_key {
        ordered.sort_by(|a, b| a.cite_key.cmp(&b.cite_key));
    }

    let mut blocks: Vec<String> = Vec::new();

    if options.comments == CommentPolicy::Grouped {
        let grouped: Vec<&str> = ordered
            .iter()
            .flat_map(|e| e.comments.iter())
            .chain(trailing_comments.iter())
            .map(String::as_str)
            .collect();
        if !grouped.is_empty() {
            blocks.push(
                grouped
                    .iter()
                    .map(|c| format_comment(c))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
    }

    for entry in &ordered {
        let mut block = String::new();
        if options.comments == CommentPolicy::Inline {
            for comment in &entry.comments {
                block.push_str(&format_comment(comment));
                block.push('\n');
            }
        }
        block.push_str(&format_entry(entry, options));
        blocks.push(block);
    }

    if options.comments == CommentPolicy::Inline && !trailing_comments.is_empty() {
        blocks.push(
            trailing_comments
                .iter()
                .map(|c| format_comment(c))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    let mut text = blocks.join("\n\n");
    text.push('\n');
    text
}

/// Fields named in `field_order` first, remainder sorted by key
fn ordered_fields<'a>(entry: &'a Entry, field_order: &[String]) -> Vec<&'a Field> {
    let mut result: Vec<&Field> = Vec::with_capacity(entry.fields.len());

    for name in field_order {
        let name = name.to_lowercase();
        result.extend(entry.fields.iter().filter(|f| f.key == name));
    }

    let mut rest: Vec<&Field> = entry
        .fields
        .iter()
        .filter(|f| !field_order.iter().any(|n| n.to_lowercase() == f.key))
        .collect();
    rest.sort_by(|a, b| a.key.cmp(&b.key));
    result.extend(rest);

    result
}

/// Bare numbers stay unbraced; everything else is brace-delimited
fn format_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }
    format!("{{{value}}}")
}

fn format_comment(text: &str) -> String {
    format!("@comment{{{text}}}")
}
