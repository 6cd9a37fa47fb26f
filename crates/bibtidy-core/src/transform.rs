//! Per-entry normalization pass
//!
//! Applies the journal abbreviation lookup, title casing, DOI cleanup,
//! page-range fixes, author checks, and field removal to every entry.
//! Each entry is handled independently; a lookup miss degrades that one
//! field and records a warning instead of aborting the batch.

use bibtidy_bibtex::Entry;
use bibtidy_cassi::CassiTable;

use crate::config::CleanupConfig;
use crate::titlecase::{normalize_title, WordOverrides};
use crate::warning::Warning;

/// Transform every entry in place, returning the accumulated warnings
pub fn transform_entries(
    entries: &mut [Entry],
    table: &CassiTable,
    config: &CleanupConfig,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for entry in entries.iter_mut() {
        transform_entry(entry, table, config, &mut warnings);
    }
    warnings
}

fn transform_entry(
    entry: &mut Entry,
    table: &CassiTable,
    config: &CleanupConfig,
    warnings: &mut Vec<Warning>,
) {
    fix_journal(entry, table, warnings);
    fix_title(entry, &config.words);
    fix_doi(entry, warnings);
    fix_pages(entry);
    check_authors(entry, warnings);

    if config.remove_enabled {
        for name in &config.remove_fields {
            entry.remove_field(name);
        }
    }
}

/// Replace the journal name with its CASSI abbreviation
///
/// Values that already match an abbreviation are left alone without a
/// warning, so a previously cleaned file stays quiet.
fn fix_journal(entry: &mut Entry, table: &CassiTable, warnings: &mut Vec<Warning>) {
    let Some(key) = entry.journal_key() else {
        return;
    };
    let value = entry.get_field(key).unwrap_or_default().to_string();

    if table.is_abbreviation(&value) {
        return;
    }
    match table.resolve(&value) {
        Some(abbreviation) => {
            let abbreviation = abbreviation.to_string();
            entry.set_field(key, abbreviation);
        }
        None => warnings.push(Warning::UnknownJournal {
            cite_key: entry.cite_key.clone(),
            journal: value,
        }),
    }
}

fn fix_title(entry: &mut Entry, overrides: &WordOverrides) {
    if let Some(title) = entry.title() {
        let normalized = normalize_title(title, overrides);
        entry.set_field("title", normalized);
    }
}

/// Strip resolver-URL prefixes from DOIs and flag values that do not
/// start with `10`; entries without a DOI get a warning of their own
fn fix_doi(entry: &mut Entry, warnings: &mut Vec<Warning>) {
    let Some(doi) = entry.doi().map(str::to_string) else {
        warnings.push(Warning::MissingDoi {
            cite_key: entry.cite_key.clone(),
        });
        return;
    };

    if let Some(bare) = doi.strip_prefix("https://dx.doi.org/") {
        let bare = bare.to_string();
        entry.set_field("doi", bare);
    } else if let Some(bare) = doi.strip_prefix("https://doi.org/") {
        let bare = bare.to_string();
        entry.set_field("doi", bare);
    } else if !doi.starts_with("10") {
        warnings.push(Warning::SuspiciousDoi {
            cite_key: entry.cite_key.clone(),
            doi,
        });
    }
}

/// Page ranges use an en-dash: `100-110` and `100 110` become `100--110`
fn fix_pages(entry: &mut Entry) {
    let Some(pages) = entry.pages().map(str::to_string) else {
        return;
    };
    if pages.contains("--") {
        return;
    }
    if pages.contains('-') {
        entry.set_field("pages", pages.replace('-', "--"));
    } else if pages.contains(' ') {
        entry.set_field("pages", pages.replace(' ', "--"));
    }
}

fn check_authors(entry: &mut Entry, warnings: &mut Vec<Warning>) {
    if let Some(author) = entry.author() {
        if author.to_lowercase().contains("and others") {
            warnings.push(Warning::IncompleteAuthors {
                cite_key: entry.cite_key.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibtidy_cassi::CassiEntry;

    fn jacs_table() -> CassiTable {
        let mut table = CassiTable::default();
        table.insert(CassiEntry {
            full_name: "Journal of the American Chemical Society".into(),
            abbreviation: "J. Am. Chem. Soc.".into(),
            coden: Some("JACSAT".into()),
        });
        table
    }

    fn article(fields: &[(&str, &str)]) -> Entry {
        let mut entry = Entry::new("Test2020", "article");
        for (k, v) in fields {
            entry.add_field(*k, *v);
        }
        entry
    }

    #[test]
    fn test_journal_resolved_case_insensitively() {
        let mut entries = vec![article(&[
            ("journal", "journal of the american chemical society"),
            ("doi", "10.1021/x"),
        ])];
        let warnings = transform_entries(&mut entries, &jacs_table(), &CleanupConfig::default());
        assert_eq!(entries[0].journal(), Some("J. Am. Chem. Soc."));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unknown_journal_warns_and_stays() {
        let mut entries = vec![article(&[
            ("journal", "Unknown Journal XYZ"),
            ("doi", "10.1000/x"),
        ])];
        let warnings = transform_entries(&mut entries, &jacs_table(), &CleanupConfig::default());
        assert_eq!(entries[0].journal(), Some("Unknown Journal XYZ"));
        assert_eq!(
            warnings,
            vec![Warning::UnknownJournal {
                cite_key: "Test2020".into(),
                journal: "Unknown Journal XYZ".into(),
            }]
        );
    }

    #[test]
    fn test_already_abbreviated_journal_is_quiet() {
        let mut entries = vec![article(&[
            ("journal", "J. Am. Chem. Soc."),
            ("doi", "10.1021/x"),
        ])];
        let warnings = transform_entries(&mut entries, &jacs_table(), &CleanupConfig::default());
        assert_eq!(entries[0].journal(), Some("J. Am. Chem. Soc."));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_journaltitle_field_is_rewritten() {
        let mut entries = vec![article(&[
            ("journaltitle", "Journal of the American Chemical Society"),
            ("doi", "10.1021/x"),
        ])];
        transform_entries(&mut entries, &jacs_table(), &CleanupConfig::default());
        assert_eq!(
            entries[0].get_field("journaltitle"),
            Some("J. Am. Chem. Soc.")
        );
    }

    #[test]
    fn test_one_miss_does_not_stop_the_batch() {
        let mut entries = vec![
            article(&[("journal", "No Such Journal"), ("doi", "10.1/x")]),
            {
                let mut e = Entry::new("Second2021", "article");
                e.add_field("journal", "journal of the american chemical society");
                e.add_field("doi", "10.2/y");
                e
            },
        ];
        let warnings = transform_entries(&mut entries, &jacs_table(), &CleanupConfig::default());
        assert_eq!(warnings.len(), 1);
        assert_eq!(entries[1].journal(), Some("J. Am. Chem. Soc."));
    }

    #[test]
    fn test_title_normalized() {
        let mut config = CleanupConfig::default();
        config.words.uppercase = vec!["DNA".into()];
        config.words.lowercase = vec!["of".into(), "the".into()];
        let mut entries = vec![article(&[
            ("title", "a study of the DNA of mice"),
            ("doi", "10.1/x"),
        ])];
        transform_entries(&mut entries, &jacs_table(), &config);
        assert_eq!(entries[0].title(), Some("A Study of the DNA of Mice"));
    }

    #[test]
    fn test_doi_url_prefix_stripped() {
        let mut entries = vec![
            article(&[("doi", "https://doi.org/10.1021/ja00001a001")]),
            article(&[("doi", "https://dx.doi.org/10.1021/ja00002a002")]),
        ];
        let warnings = transform_entries(&mut entries, &jacs_table(), &CleanupConfig::default());
        assert_eq!(entries[0].doi(), Some("10.1021/ja00001a001"));
        assert_eq!(entries[1].doi(), Some("10.1021/ja00002a002"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_suspicious_doi_warns() {
        let mut entries = vec![article(&[("doi", "doi:10.1021/x")])];
        let warnings = transform_entries(&mut entries, &jacs_table(), &CleanupConfig::default());
        assert_eq!(
            warnings,
            vec![Warning::SuspiciousDoi {
                cite_key: "Test2020".into(),
                doi: "doi:10.1021/x".into(),
            }]
        );
    }

    #[test]
    fn test_missing_doi_warns() {
        let mut entries = vec![article(&[("title", "No Doi Here")])];
        let warnings = transform_entries(&mut entries, &jacs_table(), &CleanupConfig::default());
        assert!(warnings.contains(&Warning::MissingDoi {
            cite_key: "Test2020".into(),
        }));
    }

    #[test]
    fn test_pages_hyphen_becomes_en_dash() {
        let mut entries = vec![
            article(&[("pages", "100-110"), ("doi", "10.1/x")]),
            article(&[("pages", "100 110"), ("doi", "10.1/x")]),
            article(&[("pages", "100--110"), ("doi", "10.1/x")]),
        ];
        transform_entries(&mut entries, &jacs_table(), &CleanupConfig::default());
        assert_eq!(entries[0].pages(), Some("100--110"));
        assert_eq!(entries[1].pages(), Some("100--110"));
        assert_eq!(entries[2].pages(), Some("100--110"));
    }

    #[test]
    fn test_and_others_warns() {
        let mut entries = vec![article(&[
            ("author", "Smith, John and others"),
            ("doi", "10.1/x"),
        ])];
        let warnings = transform_entries(&mut entries, &jacs_table(), &CleanupConfig::default());
        assert!(warnings.contains(&Warning::IncompleteAuthors {
            cite_key: "Test2020".into(),
        }));
    }

    #[test]
    fn test_field_removal() {
        let mut config = CleanupConfig::default();
        config.remove_enabled = true;
        config.remove_fields = vec!["abstract".into(), "mendeley-groups".into()];
        let mut entries = vec![article(&[
            ("abstract", "long text"),
            ("mendeley-groups", "Thesis"),
            ("year", "2020"),
            ("doi", "10.1/x"),
        ])];
        transform_entries(&mut entries, &jacs_table(), &config);
        assert!(!entries[0].has_field("abstract"));
        assert!(!entries[0].has_field("mendeley-groups"));
        assert!(entries[0].has_field("year"));
    }

    #[test]
    fn test_removal_disabled_keeps_fields() {
        let mut config = CleanupConfig::default();
        config.remove_enabled = false;
        let mut entries = vec![article(&[("abstract", "kept"), ("doi", "10.1/x")])];
        transform_entries(&mut entries, &jacs_table(), &config);
        assert_eq!(entries[0].get_field("abstract"), Some("kept"));
    }
}
