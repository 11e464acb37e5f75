//! Per-image settings resolution.
//!
//! Combines the built-in caption template, the global `[image-captions]`
//! values and the override registered for the image's `"level.number"` key.
//! An override field always beats the global field it names.
//!
//! Override keys are parsed once when the resolver is built. Keys that don't
//! parse as `<level>.<number>` are dropped; the lookup is then a plain map
//! access on the structured key, so `"01.1.1"` and `"1.1.1"` address the same
//! image.

use crate::config::{CaptionsConfig, ImageOverride};
use crate::types::PageLevel;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Position key an override is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverrideKey {
    pub page_level: PageLevel,
    pub page_image_number: u32,
}

impl OverrideKey {
    pub fn new(page_level: PageLevel, page_image_number: u32) -> Self {
        Self {
            page_level,
            page_image_number,
        }
    }

    /// Parse `"1.2.3"` into level `1.2`, image `3`.
    ///
    /// At least two segments are required: a key with a single number has no
    /// page level.
    pub fn parse(key: &str) -> Option<Self> {
        let (level, number) = key.trim().rsplit_once('.')?;
        let page_level = PageLevel::parse(level)?;
        let page_image_number = number.trim().parse::<u32>().ok().filter(|n| *n > 0)?;
        Some(Self::new(page_level, page_image_number))
    }
}

/// Fully merged settings for one numbered image.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSettings {
    pub caption_template: String,
    pub list_caption_template: String,
    pub alignment: Option<String>,
    /// Attribute name → value, sorted by name.
    pub attributes: BTreeMap<String, String>,
}

/// Outcome of resolving settings for a tentative position.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Numbered(EffectiveSettings),
    /// The override for this position asks for the image to stay unnumbered.
    Skip,
}

/// Resolves [`EffectiveSettings`] for image positions. Never fails.
#[derive(Debug, Clone)]
pub struct SettingsResolver {
    global: CaptionsConfig,
    overrides: HashMap<OverrideKey, ImageOverride>,
}

impl SettingsResolver {
    pub fn new(config: &CaptionsConfig) -> Self {
        let mut overrides = HashMap::new();
        for (raw_key, image_override) in &config.images {
            match OverrideKey::parse(raw_key) {
                Some(key) => {
                    overrides.insert(key, image_override.clone());
                }
                None => debug!(key = %raw_key, "ignoring malformed image override key"),
            }
        }
        Self {
            global: config.clone(),
            overrides,
        }
    }

    pub fn config(&self) -> &CaptionsConfig {
        &self.global
    }

    pub fn resolve(&self, key: &OverrideKey) -> Resolution {
        let image_override = self.overrides.get(key);
        if image_override.is_some_and(|o| o.skip) {
            return Resolution::Skip;
        }

        let global = &self.global;
        let caption_template = image_override
            .and_then(|o| o.caption.clone())
            .unwrap_or_else(|| global.caption.clone());
        let list_caption_template = image_override
            .and_then(|o| o.list_caption.clone())
            .or_else(|| global.list_caption.clone())
            .unwrap_or_else(|| caption_template.clone());
        let alignment = image_override
            .and_then(|o| o.align.clone())
            .or_else(|| global.align.clone());

        let mut attributes = global.attributes.clone();
        if let Some(o) = image_override {
            attributes.extend(o.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Resolution::Numbered(EffectiveSettings {
            caption_template,
            list_caption_template,
            alignment,
            attributes,
        })
    }
}
