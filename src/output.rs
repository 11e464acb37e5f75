//! CLI output formatting.
//!
//! Pages are displayed by their level and title, nested by depth, with the
//! filesystem shown as secondary context. The primary identity of a figure is
//! its id.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Pages
//! 1.1 Field Guide
//!     Source: README.md
//! 1.3 Setup
//!     Source: 020-setup/README.md
//!     1.3.1 Linux
//!         Source: 020-setup/010-linux.md
//!
//! Config
//!     Caption: Figure _PAGE_LEVEL_._PAGE_IMAGE_NUMBER_: _CAPTION_
//!     Registry: {{ pictures }}
//!     Overrides: 1
//!
//! Figures
//! 1 fig1.1.1 Figure 1.1.1: The field kit, packed
//!     Source: images/kit.png
//! ```
//!
//! ## Build
//!
//! ```text
//! 1.1 Field Guide → index.html
//!     fig1.1.1 Figure 1.1.1: The field kit, packed
//! 1.3 Setup → setup/index.html
//!     1.3.1 Linux → setup/linux.html
//!         fig1.3.1.1 Figure 1.3.1.1: Terminal session
//!
//! Generated 6 pages, 5 figures, 1 registry
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::book::{Book, Page};
use crate::generate::RenderedBook;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Nesting of a page below the top of the book. `1.1` and `1.2` are at 0.
fn page_depth(page: &Page) -> usize {
    page.level.depth().saturating_sub(2)
}

fn page_header(page: &Page) -> String {
    format!("{} {}", page.level, page.title)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(book: &Book, rendered: &RenderedBook) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for page in &book.pages {
        let depth = page_depth(page);
        lines.push(format!("{}{}", indent(depth), page_header(page)));
        let source = match &page.source_path {
            Some(path) => path.display().to_string(),
            None => "(no README.md)".to_string(),
        };
        lines.push(format!("{}Source: {}", indent(depth + 1), source));
    }

    let captions = &book.config.captions;
    lines.push(String::new());
    lines.push("Config".to_string());
    lines.push(format!("{}Caption: {}", indent(1), captions.caption));
    if let Some(list) = &captions.list_caption {
        lines.push(format!("{}List caption: {}", indent(1), list));
    }
    if let Some(variable) = &captions.variable_name {
        lines.push(format!("{}Registry: {{{{ {} }}}}", indent(1), variable));
    }
    if !captions.images.is_empty() {
        lines.push(format!("{}Overrides: {}", indent(1), captions.images.len()));
    }

    lines.push(String::new());
    lines.push("Figures".to_string());
    for figure in rendered.figures.references() {
        lines.push(format!(
            "{} {} {}",
            figure.book_image_number,
            figure.figure_id,
            figure.rendered_caption
        ));
        lines.push(format!("{}Source: {}", indent(1), figure.source_url));
    }
    lines
}

pub fn print_check_output(book: &Book, rendered: &RenderedBook) {
    for line in format_check_output(book, rendered) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(book: &Book, rendered: &RenderedBook) -> Vec<String> {
    let references = rendered.figures.references();
    let mut lines = Vec::new();

    for page in &book.pages {
        let depth = page_depth(page);
        lines.push(format!(
            "{}{} → {}",
            indent(depth),
            page_header(page),
            page.output_path
        ));
        for figure in references.iter().filter(|r| r.page_level == page.level) {
            lines.push(format!(
                "{}{} {}",
                indent(depth + 1),
                figure.figure_id,
                figure.rendered_caption
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(book.pages.len(), "page", "pages"),
        plural(references.len(), "figure", "figures"),
        plural(rendered.figures.placeholder_count(), "registry", "registries")
    ));
    lines
}

pub fn print_build_output(book: &Book, rendered: &RenderedBook) {
    for line in format_build_output(book, rendered) {
        println!("{}", line);
    }
}
