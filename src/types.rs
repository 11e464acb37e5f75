//! Shared types passed between the numbering core and the host pipeline.
//!
//! `ImageReference` is also what ends up in `figures.json`, so everything here
//! is serializable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchical position of a page in the book, e.g. `1.2.1`.
///
/// Levels are taken exactly as the host supplies them. No attempt is made to
/// renumber or correct them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageLevel(Vec<u32>);

impl PageLevel {
    pub fn new(parts: Vec<u32>) -> Self {
        Self(parts)
    }

    /// Parse a dotted level such as `"1.2.1"`.
    ///
    /// Returns `None` for empty input, empty segments, or any segment that is
    /// not a positive integer.
    pub fn parse(dotted: &str) -> Option<Self> {
        let parts = dotted
            .split('.')
            .map(|part| part.trim().parse::<u32>().ok().filter(|n| *n > 0))
            .collect::<Option<Vec<_>>>()?;
        if parts.is_empty() {
            None
        } else {
            Some(Self(parts))
        }
    }

    pub fn parts(&self) -> &[u32] {
        &self.0
    }

    /// Level of the `index`-th (1-based) child page of this one.
    pub fn child(&self, index: u32) -> Self {
        let mut parts = self.0.clone();
        parts.push(index);
        Self(parts)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for PageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// One numbered image, created when the image is visited and never changed
/// afterwards.
///
/// Images left bare (no caption text, inline, skipped by an override, or
/// with a caption that rendered empty) never produce one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReference {
    pub source_url: String,
    pub alt_text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title_text: String,
    pub page_level: PageLevel,
    /// Host path of the page the image lives on, used for registry links.
    pub page_path: String,
    pub page_image_number: u32,
    pub book_image_number: u32,
    pub figure_id: String,
    /// Never empty.
    pub rendered_caption: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
}

/// `title` wins over `alt` unless it is blank.
pub fn caption_body<'a>(alt: &'a str, title: &'a str) -> &'a str {
    if title.trim().is_empty() { alt } else { title }
}

/// Figure id for a position: `fig` + dotted page level + `.` + page image number.
pub fn figure_id(level: &PageLevel, page_image_number: u32) -> String {
    format!("fig{level}.{page_image_number}")
}

/// Row of the rendered figure registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryEntry {
    pub book_image_number: u32,
    pub page_level: PageLevel,
    pub page_image_number: u32,
    pub figure_id: String,
    pub page_path: String,
    pub alt_or_title: String,
    pub list_caption: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_displays_dotted() {
        assert_eq!(PageLevel::new(vec![1, 2, 1]).to_string(), "1.2.1");
        assert_eq!(PageLevel::new(vec![1]).to_string(), "1");
    }

    #[test]
    fn level_parse_accepts_dotted_positive_integers() {
        assert_eq!(PageLevel::parse("1.2"), Some(PageLevel::new(vec![1, 2])));
        assert_eq!(PageLevel::parse("3"), Some(PageLevel::new(vec![3])));
    }

    #[test]
    fn level_parse_rejects_garbage() {
        assert_eq!(PageLevel::parse(""), None);
        assert_eq!(PageLevel::parse("1..2"), None);
        assert_eq!(PageLevel::parse("1.a"), None);
        assert_eq!(PageLevel::parse("0.1"), None);
    }

    #[test]
    fn child_appends_index() {
        let level = PageLevel::new(vec![1, 3]);
        assert_eq!(level.child(2).parts(), &[1, 3, 2]);
        assert_eq!(level.child(2).depth(), 3);
    }

    #[test]
    fn figure_id_format() {
        assert_eq!(figure_id(&PageLevel::new(vec![1, 1]), 1), "fig1.1.1");
        assert_eq!(figure_id(&PageLevel::new(vec![1, 2, 1]), 4), "fig1.2.1.4");
    }

    #[test]
    fn caption_body_prefers_title() {
        assert_eq!(caption_body("alt", "title"), "title");
        assert_eq!(caption_body("alt", ""), "alt");
        assert_eq!(caption_body("alt", "   "), "alt");
    }
}
