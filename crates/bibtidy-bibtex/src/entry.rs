//! BibTeX entry data structures

use serde::{Deserialize, Serialize};

/// A single BibTeX field (key-value pair)
///
/// Keys are stored lowercase; the parser normalizes them on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub value: String,
}

/// A parsed BibTeX entry
///
/// The entry type is kept as an open string so nonstandard types such as
/// `@software` or `@dataset` survive a round trip unchanged. Fields keep
/// their input order until the formatter reorders them. `comments` holds
/// the `@comment{...}` blocks that preceded this entry in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub cite_key: String,
    pub entry_type: String,
    pub fields: Vec<Field>,
    pub comments: Vec<String>,
}

impl Entry {
    pub fn new(cite_key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            cite_key: cite_key.into(),
            entry_type: entry_type.into().to_lowercase(),
            fields: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Append a field, lowercasing the key
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field {
            key: key.into().to_lowercase(),
            value: value.into(),
        });
    }

    /// Get a field value by key (case-insensitive)
    pub fn get_field(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    /// Overwrite a field value in place, or append the field if absent
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) {
        let lower = key.to_lowercase();
        match self.fields.iter_mut().find(|f| f.key == lower) {
            Some(field) => field.value = value.into(),
            None => self.fields.push(Field {
                key: lower,
                value: value.into(),
            }),
        }
    }

    /// Delete a field by key; a no-op if the field is absent
    pub fn remove_field(&mut self, key: &str) {
        let lower = key.to_lowercase();
        self.fields.retain(|f| f.key != lower);
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.get_field(key).is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.get_field("title")
    }

    pub fn author(&self) -> Option<&str> {
        self.get_field("author")
    }

    pub fn doi(&self) -> Option<&str> {
        self.get_field("doi")
    }

    pub fn pages(&self) -> Option<&str> {
        self.get_field("pages")
    }

    /// The journal field, accepting the biblatex `journaltitle` spelling
    pub fn journal(&self) -> Option<&str> {
        self.get_field("journal").or_else(|| self.get_field("journaltitle"))
    }

    /// Which journal-like key this entry carries, if any
    pub fn journal_key(&self) -> Option<&'static str> {
        if self.has_field("journal") {
            Some("journal")
        } else if self.has_field("journaltitle") {
            Some("journaltitle")
        } else {
            None
        }
    }
}
