//! HTML site generation.
//!
//! Takes a scanned [`Book`] and writes the static site. Figures are numbered
//! while pages are rendered, so generation runs in two passes:
//!
//! 1. **Render.** Pages are rendered in build order against one
//!    [`BuildState`]. Registry placeholders are left as slots.
//! 2. **Resolve.** The state is frozen and every slot is filled with the
//!    complete figure registry. Nothing is numbered in this pass.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html          # README.md
//! ├── getting-started.html
//! ├── setup/
//! │   ├── index.html      # 020-setup/README.md (or an empty chapter page)
//! │   └── linux.html
//! ├── images/             # Non-markdown files, copied with the same slugs
//! │   └── kit.png
//! └── figures.json        # Every numbered figure, in book order
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for the page shell. Page bodies come
//! from [`crate::markdown`].

use crate::book::{Book, Page};
use crate::markdown::{self, PageOutput};
use crate::naming::parse_entry_name;
use crate::state::{BuildState, CaptionError, FinishedBuild};
use crate::types::{ImageReference, RegistryEntry};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Caption error: {0}")]
    Caption(#[from] CaptionError),
}

/// Name of the figure manifest written next to the pages.
pub const FIGURES_FILE: &str = "figures.json";

const CSS: &str = include_str!("../static/book.css");

/// A page body with every placeholder resolved.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub output_path: String,
    pub title: String,
    /// Page body HTML, without the document shell.
    pub body: String,
}

#[derive(Debug)]
pub struct RenderedBook {
    pub pages: Vec<RenderedPage>,
    pub figures: FinishedBuild,
}

impl RenderedBook {
    pub fn page(&self, output_path: &str) -> Option<&RenderedPage> {
        self.pages.iter().find(|p| p.output_path == output_path)
    }
}

/// Contents of `figures.json`.
#[derive(Debug, Serialize)]
pub struct FiguresManifest<'a> {
    pub title: &'a str,
    pub figures: &'a [ImageReference],
    pub registry: &'a [RegistryEntry],
}

/// Render every page of the book without touching the filesystem.
pub fn render_book(book: &Book) -> Result<RenderedBook, GenerateError> {
    let mut state = BuildState::new(&book.config.captions);

    let mut first_pass: Vec<(&Page, PageOutput)> = Vec::with_capacity(book.pages.len());
    for page in &book.pages {
        state.begin_page(page.level.clone(), page.url());
        let output = markdown::render_page(&page.markdown, &mut state)?;
        debug!(
            page = %page.level,
            path = %page.output_path,
            placeholders = output.placeholders().count(),
            "rendered page"
        );
        first_pass.push((page, output));
    }

    let figures = state.finish();
    let pages = first_pass
        .into_iter()
        .map(|(page, output)| RenderedPage {
            output_path: page.output_path.clone(),
            title: page.title.clone(),
            body: output.resolve(&figures),
        })
        .collect();

    Ok(RenderedBook { pages, figures })
}

/// Render the book and write the site to `output_dir`.
pub fn build(book: &Book, output_dir: &Path) -> Result<RenderedBook, GenerateError> {
    let rendered = render_book(book)?;

    fs::create_dir_all(output_dir)?;
    let output_root = fs::canonicalize(output_dir)?;
    copy_assets(&book.root, output_dir, &output_root, true)?;

    for (page, rendered_page) in book.pages.iter().zip(&rendered.pages) {
        let document = render_page_document(book, page, &rendered_page.body);
        let path = output_dir.join(&page.output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, document.into_string())?;
        info!(page = %page.level, path = %page.output_path, "generated page");
    }

    let manifest = FiguresManifest {
        title: &book.config.title,
        figures: rendered.figures.references(),
        registry: rendered.figures.entries(),
    };
    fs::write(
        output_dir.join(FIGURES_FILE),
        serde_json::to_string_pretty(&manifest)?,
    )?;

    info!(
        pages = rendered.pages.len(),
        figures = rendered.figures.references().len(),
        output = %output_dir.display(),
        "book generated"
    );
    Ok(rendered)
}

/// Copy every non-markdown file, renaming directories to their slugs so
/// assets sit next to the pages that reference them.
///
/// `output_root` is the canonical output directory; it is never copied into
/// itself, however the caller spelled it.
fn copy_assets(src: &Path, dst: &Path, output_root: &Path, is_root: bool) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();
        if file_name.starts_with('.') || file_name.starts_with('_') {
            continue;
        }

        if src_path.is_dir() {
            if fs::canonicalize(&src_path)?.starts_with(output_root) {
                continue;
            }
            let dst_path = dst.join(parse_entry_name(&file_name).slug);
            fs::create_dir_all(&dst_path)?;
            copy_assets(&src_path, &dst_path, output_root, false)?;
        } else {
            let is_markdown = src_path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("md"));
            let is_config = is_root && file_name == "book.toml";
            if !is_markdown && !is_config {
                fs::copy(&src_path, dst.join(&file_name))?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Table of contents, one row per page in build order.
fn render_toc(pages: &[Page], current_path: &str) -> Markup {
    html! {
        nav.toc {
            ol {
                @for page in pages {
                    @let is_current = page.output_path == current_path;
                    li class=[is_current.then_some("current")] data-level=(page.level.to_string()) {
                        a href=(page.url()) {
                            span.level { (page.level.to_string()) }
                            (page.title)
                        }
                    }
                }
            }
        }
    }
}

fn render_page_document(book: &Book, page: &Page, body: &str) -> Markup {
    let document_title = if page.title == book.config.title {
        page.title.clone()
    } else {
        format!("{} - {}", page.title, book.config.title)
    };

    let content = html! {
        header.book-header {
            a href="/" { (book.config.title) }
        }
        div.book-layout {
            (render_toc(&book.pages, &page.output_path))
            main.page {
                (PreEscaped(body))
            }
        }
    };

    base_document(&document_title, CSS, content)
}

// ============================================================================
// Tests
// ============================================================================
