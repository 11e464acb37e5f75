//! Per-build numbering state.
//!
//! A [`BuildState`] is created at the start of a build and threaded through
//! every page visit. It owns the position counters, the resolved settings and
//! the registry; nothing is global. The host drives it in document order:
//!
//! ```text
//! for page in build order:
//!     state.begin_page(level, path)
//!     for each image node:   state.render_image(&node)?
//!     for each placeholder:  state.placeholder()?
//! let finished = state.finish();          // frozen, read-only
//! for each placeholder id:   finished.render_placeholder(id)
//! ```

use crate::caption::{CaptionContext, render_caption};
use crate::config::CaptionsConfig;
use crate::figure::{BareReason, Figure, ImageNode, ImageTag, Rendered};
use crate::position::PositionTracker;
use crate::registry::{PlaceholderId, Registry};
use crate::settings::{Resolution, SettingsResolver};
use crate::types::{ImageReference, PageLevel, RegistryEntry};
use maud::Markup;
use thiserror::Error;
use tracing::debug;

/// Host contract violations. The core never recovers from these.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CaptionError {
    #[error("image on page {page} has no source URL")]
    MissingSource { page: String },
    #[error("{0} visited before any page was started")]
    NoCurrentPage(&'static str),
}

/// The page currently being visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub level: PageLevel,
    /// Host path used in registry links, e.g. `/020-setup.html`.
    pub path: String,
}

#[derive(Debug)]
pub struct BuildState {
    resolver: SettingsResolver,
    tracker: PositionTracker,
    registry: Registry,
    references: Vec<ImageReference>,
    page: Option<PageContext>,
}

impl BuildState {
    pub fn new(config: &CaptionsConfig) -> Self {
        Self {
            resolver: SettingsResolver::new(config),
            tracker: PositionTracker::new(),
            registry: Registry::new(),
            references: Vec::new(),
            page: None,
        }
    }

    pub fn begin_page(&mut self, level: PageLevel, path: impl Into<String>) {
        self.page = Some(PageContext {
            level,
            path: path.into(),
        });
    }

    pub fn current_page(&self) -> Option<&PageContext> {
        self.page.as_ref()
    }

    /// Name pages use for registry placeholders, when the feature is enabled.
    pub fn registry_variable(&self) -> Option<&str> {
        self.resolver.config().variable_name.as_deref()
    }

    /// Decide how an image node renders and number it if it becomes a figure.
    pub fn render_image(&mut self, node: &ImageNode) -> Result<Rendered, CaptionError> {
        let page = self
            .page
            .as_ref()
            .ok_or(CaptionError::NoCurrentPage("image"))?;
        if node.url.trim().is_empty() {
            return Err(CaptionError::MissingSource {
                page: page.level.to_string(),
            });
        }

        if let Some(reason) = node.unnumbered_reason() {
            debug!(src = %node.url, ?reason, "image left bare");
            return Ok(Rendered::bare(node, reason));
        }

        let pending = self.tracker.peek_next(&page.level);
        let settings = match self.resolver.resolve(&pending.override_key()) {
            Resolution::Numbered(settings) => settings,
            Resolution::Skip => {
                debug!(src = %node.url, slot = %pending.position().figure_id(), "image skipped by override");
                self.tracker.release(pending);
                return Ok(Rendered::bare(node, BareReason::Configured));
            }
        };
        let body = node.caption_body();
        let caption = render_caption(
            &settings.caption_template,
            &CaptionContext::new(body, pending.position()),
        );
        if caption.is_empty() {
            debug!(src = %node.url, slot = %pending.position().figure_id(), "caption rendered empty");
            self.tracker.release(pending);
            return Ok(Rendered::bare(node, BareReason::EmptyCaption));
        }
        let position = self.tracker.commit(pending);

        let list_caption = render_caption(
            &settings.list_caption_template,
            &CaptionContext::new(body, &position),
        );
        let image = ImageTag::from_node(node).with_attributes(&settings.attributes);
        let figure_id = position.figure_id();

        debug!(
            figure = %figure_id,
            book_number = position.book_image_number,
            src = %node.url,
            "numbered image"
        );

        self.registry.record(RegistryEntry {
            book_image_number: position.book_image_number,
            page_level: position.page_level.clone(),
            page_image_number: position.page_image_number,
            figure_id: figure_id.clone(),
            page_path: page.path.clone(),
            alt_or_title: body.to_string(),
            list_caption,
        });
        self.references.push(ImageReference {
            source_url: node.url.clone(),
            alt_text: node.alt_text.clone(),
            title_text: node.title_text.clone(),
            page_level: position.page_level,
            page_path: page.path.clone(),
            page_image_number: position.page_image_number,
            book_image_number: position.book_image_number,
            figure_id: figure_id.clone(),
            rendered_caption: caption.clone(),
            attributes: image.attributes.clone(),
            alignment: settings.alignment.clone(),
        });

        Ok(Rendered::Figure(Figure {
            id: figure_id,
            image,
            caption,
            alignment: settings.alignment,
            link: node.link.clone(),
        }))
    }

    /// Register a registry placeholder on the current page.
    pub fn placeholder(&mut self) -> Result<PlaceholderId, CaptionError> {
        let page = self
            .page
            .as_ref()
            .ok_or(CaptionError::NoCurrentPage("registry placeholder"))?;
        let id = self.registry.register_placeholder(&page.path);
        debug!(page = %page.level, known = self.registry.entries().len(), "registry placeholder");
        Ok(id)
    }

    /// Render a placeholder now, with only the figures seen before it.
    pub fn render_placeholder_now(&self, id: PlaceholderId) -> Markup {
        self.registry.render_partial(id)
    }

    pub fn references(&self) -> &[ImageReference] {
        &self.references
    }

    /// End the walk. The returned build is read-only.
    pub fn finish(self) -> FinishedBuild {
        FinishedBuild {
            registry: self.registry,
            references: self.references,
        }
    }
}

/// A build whose figures are all known.
#[derive(Debug)]
pub struct FinishedBuild {
    registry: Registry,
    references: Vec<ImageReference>,
}

impl FinishedBuild {
    /// Render a placeholder against the complete registry. Every placeholder
    /// gets the same list.
    pub fn render_placeholder(&self, id: PlaceholderId) -> Markup {
        debug_assert!(
            id.index() < self.registry.placeholders().len(),
            "placeholder {} was not issued by this build",
            id.index()
        );
        self.registry.render_all()
    }

    pub fn references(&self) -> &[ImageReference] {
        &self.references
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        self.registry.entries()
    }

    pub fn placeholder_count(&self) -> usize {
        self.registry.placeholders().len()
    }
}
