//! Book and caption configuration.
//!
//! Configuration lives in `book.toml` at the book root. Everything is optional;
//! the stock defaults are the base layer and the user's file is merged on top.
//!
//! ## Configuration Options
//!
//! ```toml
//! title = "My Book"
//!
//! [image-captions]
//! caption = "Figure: _CAPTION_"     # Template for figure captions
//! list_caption = "_BOOK_IMAGE_NUMBER_. _CAPTION_"  # Registry rows (defaults to caption)
//! align = "left"                    # Class applied to <figcaption>
//! variable_name = "pictures"        # Enables {{ pictures }} registry placeholders
//!
//! [image-captions.attributes]
//! width = "300"                     # Added to every figure <img>
//!
//! [image-captions.images."1.2.1"]
//! caption = "Special: _CAPTION_"    # Per-image override, keyed by page level + number
//! skip = true
//! ```
//!
//! ## Leniency
//!
//! Unlike the file as a whole, values under `[image-captions]` never fail the
//! build. A wrong type or an unparseable override key is ignored and the
//! default stays in effect. Only an unreadable file or invalid TOML syntax is
//! an error.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Built-in caption template.
pub const DEFAULT_CAPTION: &str = "Figure: _CAPTION_";

/// Table name under which caption settings live in `book.toml`.
pub const CAPTIONS_TABLE: &str = "image-captions";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Whole-book configuration.
#[derive(Debug, Clone, Serialize)]
pub struct BookConfig {
    /// Book title, used for the HTML `<title>` of pages without a heading.
    pub title: String,
    #[serde(rename = "image-captions")]
    pub captions: CaptionsConfig,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            title: "Book".to_string(),
            captions: CaptionsConfig::default(),
        }
    }
}

/// Global caption settings plus per-image overrides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionsConfig {
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    /// Overrides keyed by `"<page level>.<page image number>"`, e.g. `"1.2.1"`.
    pub images: BTreeMap<String, ImageOverride>,
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            caption: DEFAULT_CAPTION.to_string(),
            list_caption: None,
            align: None,
            attributes: BTreeMap::new(),
            variable_name: None,
            images: BTreeMap::new(),
        }
    }
}

/// Settings for one specific image. Every field it sets beats the global one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    pub skip: bool,
}

impl CaptionsConfig {
    /// Extract caption settings from a raw `[image-captions]` table.
    ///
    /// Missing or mistyped fields keep their defaults.
    pub fn from_value(value: &toml::Value) -> Self {
        let defaults = Self::default();
        let Some(table) = value.as_table() else {
            return defaults;
        };

        Self {
            caption: string_field(table, "caption").unwrap_or(defaults.caption),
            list_caption: string_field(table, "list_caption"),
            align: string_field(table, "align").filter(|a| !a.trim().is_empty()),
            attributes: table
                .get("attributes")
                .map(attribute_map)
                .unwrap_or_default(),
            variable_name: string_field(table, "variable_name")
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            images: table
                .get("images")
                .and_then(toml::Value::as_table)
                .map(|images| {
                    images
                        .iter()
                        .filter_map(|(key, v)| {
                            v.as_table().map(|t| (key.clone(), ImageOverride::from_table(t)))
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl ImageOverride {
    fn from_table(table: &toml::value::Table) -> Self {
        Self {
            caption: string_field(table, "caption"),
            list_caption: string_field(table, "list_caption"),
            align: string_field(table, "align").filter(|a| !a.trim().is_empty()),
            attributes: table
                .get("attributes")
                .map(attribute_map)
                .unwrap_or_default(),
            skip: table
                .get("skip")
                .and_then(toml::Value::as_bool)
                .unwrap_or(false),
        }
    }
}

fn string_field(table: &toml::value::Table, key: &str) -> Option<String> {
    table.get(key).and_then(toml::Value::as_str).map(String::from)
}

/// Attribute values may be written as strings, numbers or booleans
/// (`width = 300` and `width = "300"` mean the same thing).
fn attribute_map(value: &toml::Value) -> BTreeMap<String, String> {
    let Some(table) = value.as_table() else {
        return BTreeMap::new();
    };
    table
        .iter()
        .filter_map(|(name, v)| {
            let rendered = match v {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                _ => return None,
            };
            Some((name.clone(), rendered))
        })
        .collect()
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock defaults as a `toml::Value::Table`, the base layer for
/// merging user configuration.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BookConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::value::Table::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `book.toml` from a book root as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join("book.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value and extract the book config.
pub fn resolve_config(base: toml::Value, overlay: Option<toml::Value>) -> BookConfig {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let defaults = BookConfig::default();
    BookConfig {
        title: merged
            .get("title")
            .and_then(toml::Value::as_str)
            .map(String::from)
            .unwrap_or(defaults.title),
        captions: merged
            .get(CAPTIONS_TABLE)
            .map(CaptionsConfig::from_value)
            .unwrap_or(defaults.captions),
    }
}

/// Load the configuration for the book rooted at `root`.
pub fn load_config(root: &Path) -> Result<BookConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    Ok(resolve_config(base, overlay))
}

/// Returns a fully-commented stock `book.toml`. Used by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Book configuration
# ==================
# All settings are optional. Values shown below are the defaults.

# Used as the page <title> when a page has no heading.
title = "Book"

# ---------------------------------------------------------------------------
# Figure numbering and captions
# ---------------------------------------------------------------------------
[image-captions]
# Caption template. Placeholders:
#   _CAPTION_            image title, or alt text when there is no title
#   _PAGE_LEVEL_         dotted level of the page, e.g. 1.2
#   _PAGE_IMAGE_NUMBER_  position of the image on its page
#   _BOOK_IMAGE_NUMBER_  position of the image in the whole book
# An image whose caption renders empty is left as a plain, unnumbered image.
caption = "Figure: _CAPTION_"

# Template for rows of the figure registry. Defaults to `caption`.
# list_caption = "_BOOK_IMAGE_NUMBER_. _CAPTION_"

# Class added to every <figcaption>.
# align = "left"

# Paragraphs consisting of exactly {{ <variable_name> }} are replaced by the
# list of all figures in the book. Unset disables the registry.
# variable_name = "pictures"

# Attributes added to every figure <img>.
[image-captions.attributes]
# width = "300"

# Per-image overrides, keyed by "<page level>.<image number on page>".
# Keys that don't parse are ignored.
[image-captions.images]
# [image-captions.images."1.2.1"]
# caption = "Special figure: _CAPTION_"
# list_caption = "Special: _CAPTION_"
# align = "center"
# skip = true
# attributes = { width = "400" }
"##
}
