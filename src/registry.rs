//! Figure registry.
//!
//! Every numbered figure is recorded here in visit order. Pages can ask for
//! the registry to be listed at a placeholder, but a placeholder is usually
//! met before the figures on later pages have been seen. Placeholders are
//! therefore never filled in on sight:
//!
//! 1. While pages are walked, [`Registry::register_placeholder`] hands out a
//!    [`PlaceholderId`] and remembers how many entries existed at that moment
//!    (the snapshot). The host keeps the id in its output instead of text.
//! 2. Once every page has been walked, the registry is frozen into a
//!    [`crate::state::FinishedBuild`] and each id is rendered against the
//!    complete list.
//!
//! [`Registry::render_partial`] renders a placeholder against its snapshot.
//! It exists for hosts that cannot run a second pass; the result lists only
//! the figures seen before the placeholder, possibly none.

use crate::types::RegistryEntry;
use maud::{Markup, html};

/// CSS class on the rendered `<ol>`.
pub const REGISTRY_CLASS: &str = "image-captions-registry";

/// Handle for one registry placeholder, valid for the build that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId(usize);

impl PlaceholderId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSlot {
    pub id: PlaceholderId,
    pub page_path: String,
    /// Entries known when the placeholder was met.
    pub snapshot: usize,
}

#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
    slots: Vec<PendingSlot>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: RegistryEntry) {
        self.entries.push(entry);
    }

    pub fn register_placeholder(&mut self, page_path: &str) -> PlaceholderId {
        let id = PlaceholderId(self.slots.len());
        self.slots.push(PendingSlot {
            id,
            page_path: page_path.to_string(),
            snapshot: self.entries.len(),
        });
        id
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn placeholders(&self) -> &[PendingSlot] {
        &self.slots
    }

    /// List of the figures seen before the placeholder was registered.
    ///
    /// Unknown ids render an empty list.
    pub fn render_partial(&self, id: PlaceholderId) -> Markup {
        let snapshot = self.slots.get(id.0).map_or(0, |slot| slot.snapshot);
        render_list(&self.entries[..snapshot.min(self.entries.len())])
    }

    /// List of every figure recorded so far.
    pub fn render_all(&self) -> Markup {
        render_list(&self.entries)
    }
}

fn render_list(entries: &[RegistryEntry]) -> Markup {
    html! {
        ol class=(REGISTRY_CLASS) {
            @for entry in entries {
                li {
                    a href={ (entry.page_path) "#" (entry.figure_id) } { (entry.list_caption) }
                }
            }
        }
    }
}
