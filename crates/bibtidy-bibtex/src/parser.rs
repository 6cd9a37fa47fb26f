//! BibTeX parser built on nom
//!
//! Handles standard BibTeX input:
//! - entries of any type, including nonstandard ones (`@software`, ...)
//! - `@string` definitions, expanded into field values
//! - `@preamble` declarations
//! - `@comment` blocks, captured and associated with the entry that follows
//! - braced and quoted field values, nested braces, `#` concatenation
//!
//! `%`-line comments are treated as inter-entry whitespace and discarded.
//! Malformed regions are recorded as [`ParseIssue`]s and skipped so one bad
//! entry does not take down the rest of the file.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    IResult,
};
use std::collections::HashMap;

use crate::entry::Entry;

/// A recoverable problem found while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub line: u32,
    pub message: String,
}

/// Parsed contents of a BibTeX file
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub entries: Vec<Entry>,
    pub strings: HashMap<String, String>,
    pub preambles: Vec<String>,
    /// Comment blocks that appeared after the last entry
    pub trailing_comments: Vec<String>,
    pub issues: Vec<ParseIssue>,
}

/// Fatal parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no BibTeX entries found in input")]
    NoEntries,
}

/// Parse a BibTeX document
pub fn parse(input: &str) -> Result<ParseResult, ParseError> {
    let mut result = ParseResult::default();
    let mut pending_comments: Vec<String> = Vec::new();

    let mut remaining = input;
    let mut line = 1u32;

    while !remaining.is_empty() {
        let rest = skip_whitespace(remaining);
        line += count_newlines(remaining, rest);
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        if remaining.starts_with('@') {
            match parse_at_block(remaining, &result.strings) {
                Ok((rest, block)) => {
                    match block {
                        AtBlock::Entry(mut entry) => {
                            entry.comments = std::mem::take(&mut pending_comments);
                            result.entries.push(entry);
                        }
                        AtBlock::String(key, value) => {
                            // First definition wins on redefinition
                            result.strings.entry(key).or_insert(value);
                        }
                        AtBlock::Preamble(text) => result.preambles.push(text),
                        AtBlock::Comment(text) => {
                            if !text.is_empty() {
                                pending_comments.push(text);
                            }
                        }
                    }
                    line += count_newlines(remaining, rest);
                    remaining = rest;
                }
                Err(_) => {
                    result.issues.push(ParseIssue {
                        line,
                        message: "malformed block".to_string(),
                    });
                    let rest = skip_to_next_block(&remaining[1..]);
                    line += count_newlines(remaining, rest);
                    remaining = rest;
                }
            }
        } else {
            // Stray text between blocks; skip to the next @
            let rest = skip_to_next_block(remaining);
            line += count_newlines(remaining, rest);
            remaining = rest;
        }
    }

    result.trailing_comments = pending_comments;

    if result.entries.is_empty() && result.issues.is_empty() {
        return Err(ParseError::NoEntries);
    }
    Ok(result)
}

enum AtBlock {
    Entry(Entry),
    String(String, String),
    Preamble(String),
    Comment(String),
}

fn count_newlines(before: &str, after: &str) -> u32 {
    let consumed = &before[..before.len() - after.len()];
    consumed.matches('\n').count() as u32
}

/// Skip whitespace and `%`-line comments
fn skip_whitespace(input: &str) -> &str {
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if let Some(stripped) = trimmed.strip_prefix('%') {
            rest = match stripped.find('\n') {
                Some(pos) => &stripped[pos + 1..],
                None => "",
            };
        } else {
            return trimmed;
        }
    }
}

fn skip_to_next_block(input: &str) -> &str {
    match input.find('@') {
        Some(pos) => &input[pos..],
        None => "",
    }
}

/// Parse one `@`-introduced block
fn parse_at_block<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtBlock> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, block_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match block_type.to_lowercase().as_str() {
        "string" => {
            let (rest, (key, value)) = parse_string_definition(rest, strings)?;
            Ok((rest, AtBlock::String(key, value)))
        }
        "preamble" => {
            let (rest, text) = parse_preamble(rest, strings)?;
            Ok((rest, AtBlock::Preamble(text)))
        }
        "comment" => {
            let (rest, text) = parse_comment_body(rest)?;
            Ok((rest, AtBlock::Comment(text)))
        }
        _ => {
            let (rest, entry) = parse_entry_body(rest, block_type, strings)?;
            Ok((rest, AtBlock::Entry(entry)))
        }
    }
}

fn parse_string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, key) = field_key(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    Ok((rest, (key.to_string(), value)))
}

fn parse_preamble<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    Ok((rest, value))
}

/// Parse a `@comment` body, capturing its text
fn parse_comment_body(input: &str) -> IResult<&str, String> {
    let (rest, _) = multispace0(input)?;
    if rest.starts_with('{') {
        let (rest, content) = parse_braced_value(rest)?;
        Ok((rest, content.trim().to_string()))
    } else {
        // Unbraced comment runs to end of line
        let pos = rest.find('\n').unwrap_or(rest.len());
        Ok((&rest[pos..], rest[..pos].trim().to_string()))
    }
}

fn parse_entry_body<'a>(
    input: &'a str,
    entry_type: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Entry> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;

    let (rest, cite_key) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./+".contains(c))(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(',')(rest)?;

    let (rest, fields) = parse_fields(rest, strings)?;

    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    let mut entry = Entry::new(cite_key, entry_type);
    for (key, value) in fields {
        entry.add_field(key, value);
    }

    Ok((rest, entry))
}

fn parse_fields<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        if rest.starts_with('}') {
            return Ok((rest, fields));
        }

        match parse_single_field(rest, strings) {
            Ok((rest, field)) => {
                fields.push(field);
                let (rest, _) = multispace0(rest)?;
                remaining = rest.strip_prefix(',').unwrap_or(rest);
            }
            Err(_) => return Ok((remaining, fields)),
        }
    }
}

fn parse_single_field<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, key) = field_key(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;

    Ok((rest, (key.to_string(), value)))
}

fn field_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

/// Parse a field value: braced, quoted, bare number, or string macro,
/// possibly concatenated with `#`
fn parse_field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        let (rest, part) = alt((
            parse_braced_value,
            parse_quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), str::to_string),
            map(field_key, |name| {
                strings
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| name.to_string())
            }),
        ))(rest)?;

        result.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(stripped) => remaining = stripped,
            None => return Ok((rest, result)),
        }
    }
}

/// Parse `{...}` with nested braces, returning the inner text
fn parse_braced_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('{') {
        return Err(nom_error(input));
    }

    let mut depth = 0usize;
    let mut escaped = false;
    for (pos, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], input[1..pos].to_string()));
                }
            }
            _ => {}
        }
    }

    Err(nom_error(input))
}

/// Parse `"..."`, keeping embedded braces so case protection survives
fn parse_quoted_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('"') {
        return Err(nom_error(input));
    }

    let mut depth = 0usize;
    let mut escaped = false;
    for (pos, c) in input.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '"' if depth == 0 => {
                return Ok((&input[pos + 1..], input[1..pos].to_string()));
            }
            _ => {}
        }
    }

    Err(nom_error(input))
}

fn nom_error(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_entry() {
        let input = r#"
@article{Smith2024,
  author = {John Smith},
  title = {A Great Paper},
  journal = {Nature},
  year = {2024},
}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.entries.len(), 1);
        assert!(result.issues.is_empty());

        let entry = &result.entries[0];
        assert_eq!(entry.cite_key, "Smith2024");
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.journal(), Some("Nature"));
        assert_eq!(entry.get_field("year"), Some("2024"));
    }

    #[test]
    fn test_field_keys_are_lowercased() {
        let input = "@article{A, TITLE = {T}, Journal = {J}}";
        let result = parse(input).unwrap();
        let entry = &result.entries[0];
        assert_eq!(entry.fields[0].key, "title");
        assert_eq!(entry.fields[1].key, "journal");
    }

    #[test]
    fn test_nonstandard_entry_type_survives() {
        let input = "@software{Tool2023, title = {A Tool}}";
        let result = parse(input).unwrap();
        assert_eq!(result.entries[0].entry_type, "software");
    }

    #[test]
    fn test_nested_braces_preserved() {
        let input = r#"@article{T, title = {The {DNA} of {LaTeX}}}"#;
        let result = parse(input).unwrap();
        assert_eq!(result.entries[0].title(), Some("The {DNA} of {LaTeX}"));
    }

    #[test]
    fn test_quoted_values_and_escapes() {
        let input = r#"@article{T, author = "Jane Doe", note = "said \"hi\""}"#;
        let result = parse(input).unwrap();
        assert_eq!(result.entries[0].author(), Some("Jane Doe"));
        assert_eq!(result.entries[0].get_field("note"), Some(r#"said \"hi\""#));
    }

    #[test]
    fn test_string_macro_expansion() {
        let input = r#"
@string{jacs = {Journal of the American Chemical Society}}
@article{X, journal = jacs}
"#;
        let result = parse(input).unwrap();
        assert_eq!(
            result.entries[0].journal(),
            Some("Journal of the American Chemical Society")
        );
    }

    #[test]
    fn test_concatenation() {
        let input = r#"
@string{pre = {Part }}
@article{X, title = pre # {Two}}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.entries[0].title(), Some("Part Two"));
    }

    #[test]
    fn test_comment_attaches_to_next_entry() {
        let input = r#"
@comment{Imported from Mendeley}
@article{A, title = {First}}
@article{B, title = {Second}}
@comment{dangling}
"#;
        let result = parse(input).unwrap();
        assert_eq!(
            result.entries[0].comments,
            vec!["Imported from Mendeley".to_string()]
        );
        assert!(result.entries[1].comments.is_empty());
        assert_eq!(result.trailing_comments, vec!["dangling".to_string()]);
    }

    #[test]
    fn test_percent_comments_discarded() {
        let input = "% generated file\n@article{A, title = {T}}";
        let result = parse(input).unwrap();
        assert_eq!(result.entries.len(), 1);
        assert!(result.entries[0].comments.is_empty());
    }

    #[test]
    fn test_malformed_entry_recovers() {
        let input = r#"
@article{Broken, title = {unclosed
@article{Good, title = {Fine}}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].cite_key, "Good");
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(parse("  \n "), Err(ParseError::NoEntries)));
    }

    #[test]
    fn test_preamble() {
        let input = "@preamble{{\\newcommand{x}}}\n@article{A, title = {T}}";
        let result = parse(input).unwrap();
        assert_eq!(result.preambles.len(), 1);
    }
}
