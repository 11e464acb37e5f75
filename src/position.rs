//! Figure position tracking.
//!
//! Two counters run over a build:
//!
//! - a **page slot** counter, reset whenever the page level changes, which
//!   gives each candidate figure on a page its 1-based position;
//! - a **book** counter, which only moves when a figure is actually numbered.
//!
//! Assigning a position is split in two steps. [`PositionTracker::peek_next`]
//! computes the next position without touching any state and hands back a
//! [`PendingPosition`]. The caller then either [`commit`]s it (the image is
//! numbered) or [`release`]s it (a per-image override asked for a skip).
//!
//! A released position gives its book number back but keeps its page slot, so
//! the override keys of later images on the same page stay where the author
//! wrote them: with `"1.1.1"` skipped, the next image is still `1.1.2`.
//!
//! [`commit`]: PositionTracker::commit
//! [`release`]: PositionTracker::release

use crate::settings::OverrideKey;
use crate::types::{self, PageLevel};

/// Final position of a numbered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub page_level: PageLevel,
    pub page_image_number: u32,
    pub book_image_number: u32,
}

impl Position {
    pub fn figure_id(&self) -> String {
        types::figure_id(&self.page_level, self.page_image_number)
    }
}

/// A position that has been predicted but not yet taken.
///
/// Dropping it without calling `commit` or `release` leaves the tracker
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending position must be committed or released"]
pub struct PendingPosition {
    position: Position,
}

impl PendingPosition {
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Key used to look up per-image overrides.
    pub fn override_key(&self) -> OverrideKey {
        OverrideKey::new(
            self.position.page_level.clone(),
            self.position.page_image_number,
        )
    }
}

#[derive(Debug, Default)]
pub struct PositionTracker {
    current_page: Option<PageLevel>,
    page_slots: u32,
    book_images: u32,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position the next figure on `page_level` would get. Does not mutate.
    pub fn peek_next(&self, page_level: &PageLevel) -> PendingPosition {
        let page_slots = if self.current_page.as_ref() == Some(page_level) {
            self.page_slots
        } else {
            0
        };
        PendingPosition {
            position: Position {
                page_level: page_level.clone(),
                page_image_number: page_slots + 1,
                book_image_number: self.book_images + 1,
            },
        }
    }

    /// Take the pending position: both counters advance.
    pub fn commit(&mut self, pending: PendingPosition) -> Position {
        self.take_slot(&pending.position);
        self.book_images = pending.position.book_image_number;
        pending.position
    }

    /// Give up a pending position. The page slot stays used, the book number
    /// is returned.
    pub fn release(&mut self, pending: PendingPosition) {
        self.take_slot(&pending.position);
    }

    /// Numbered figures so far in the whole build.
    pub fn book_count(&self) -> u32 {
        self.book_images
    }

    fn take_slot(&mut self, position: &Position) {
        if self.current_page.as_ref() != Some(&position.page_level) {
            self.current_page = Some(position.page_level.clone());
        }
        self.page_slots = position.page_image_number;
    }
}
