//! `NNN-name` convention for book entries.
//!
//! Chapter files and directories carry an optional numeric prefix that fixes
//! their order in the book:
//!
//! - `010-getting-started.md` → order 10, slug `getting-started`, title "getting started"
//! - `020-setup/` → order 20, slug `setup`
//! - `notes.md` → unnumbered, placed after all numbered siblings

use std::cmp::Ordering;

/// Result of parsing an entry name such as `020-first-steps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Number prefix if present.
    pub number: Option<u32>,
    /// Name after the prefix, dashes preserved. Used in output paths.
    pub slug: String,
    /// Slug with dashes turned into spaces.
    pub title: String,
}

impl ParsedName {
    /// Numbered entries first by number, then unnumbered ones by slug.
    pub fn book_order(&self, other: &Self) -> Ordering {
        match (self.number, other.number) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.slug.cmp(&other.slug)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.slug.cmp(&other.slug),
        }
    }
}

/// Parse a file stem or directory name.
///
/// A name that is only a number (`"010"`) keeps the number as its slug so the
/// output file still has a name.
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some((prefix, rest)) = name.split_once('-') {
        if let Ok(number) = prefix.parse::<u32>() {
            let slug = if rest.is_empty() { prefix } else { rest };
            return ParsedName {
                number: Some(number),
                slug: slug.to_string(),
                title: rest.replace('-', " "),
            };
        }
    }
    if let Ok(number) = name.parse::<u32>() {
        return ParsedName {
            number: Some(number),
            slug: name.to_string(),
            title: String::new(),
        };
    }
    ParsedName {
        number: None,
        slug: name.to_string(),
        title: name.replace('-', " "),
    }
}
