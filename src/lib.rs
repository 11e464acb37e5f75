//! # Book Figures
//!
//! Automatic figure numbering for markdown books. Every captioned image that
//! stands in its own paragraph becomes a `<figure>` with a stable id and a
//! caption rendered from a template; a registry of all figures can be listed
//! anywhere in the book.
//!
//! # Architecture: Two-Pass Build
//!
//! ```text
//! 1. Scan      book/   →  Book           (pages in build order, with levels)
//! 2. Render    Book    →  page segments  (figures numbered, registry slots left open)
//! 3. Resolve   slots   →  dist/          (registry filled from the frozen build)
//! ```
//!
//! A registry placeholder on the first page still lists figures from the last
//! one, because slots are only filled after every page has been visited.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`book`] | Walks the book directory, assigns page levels and output paths |
//! | [`markdown`] | Renders a page with pulldown-cmark, classifying images as block or inline |
//! | [`state`] | Per-build numbering state threaded through every page |
//! | [`position`] | Page and book image counters |
//! | [`settings`] | Global settings merged with per-image overrides |
//! | [`caption`] | Caption template rendering |
//! | [`figure`] | Bare image and `<figure>` markup |
//! | [`registry`] | Figure registry and placeholder resolution |
//! | [`generate`] | Writes pages, assets and `figures.json` |
//! | [`config`] | `book.toml` loading, layered over stock defaults |
//! | [`types`] | Page levels and serializable figure records |
//! | [`naming`] | `NNN-name` filename convention parser |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Figure Identity
//!
//! A figure is identified by the level of its page plus its position on that
//! page: the second figure on page `1.3.1` is `fig1.3.1.2`. Per-image overrides
//! in `book.toml` use the same key without the `fig` prefix. Images that are
//! never numbered (inline, or with neither alt nor title text) do not take a
//! position, so adding a decorative image does not shift the figures after it.
//!
//! ## No Global State
//!
//! Counters, settings and the registry live in one [`state::BuildState`]
//! owned by the build. Two builds in the same process never see each other's
//! figures.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). All interpolation
//! is escaped, including alt text and captions taken from the book.

pub mod book;
pub mod caption;
pub mod config;
pub mod figure;
pub mod generate;
pub mod markdown;
pub mod naming;
pub mod output;
pub mod position;
pub mod registry;
pub mod settings;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
