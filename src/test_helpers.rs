//! Shared test utilities for the book-figures test suite.
//!
//! Provides fixture setup, page lookups and figure assertions that work with
//! [`Book`] and the output of a build.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let book = scan(tmp.path()).unwrap();
//!
//! assert_eq!(page_levels(&book), ["1.1", "1.2", "1.3", "1.3.1", "1.3.2", "1.4"]);
//! let linux = find_page(&book, "setup/linux.html");
//! assert_eq!(linux.title, "Linux");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::book::{Book, Page};
use crate::types::ImageReference;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/book/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/book");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a page by output path. Panics if not found.
pub fn find_page<'a>(book: &'a Book, output_path: &str) -> &'a Page {
    book.page(output_path).unwrap_or_else(|| {
        let paths = page_paths(book);
        panic!("page '{output_path}' not found. Available: {paths:?}")
    })
}

/// Find a numbered figure by id. Panics if not found.
pub fn find_figure<'a>(references: &'a [ImageReference], figure_id: &str) -> &'a ImageReference {
    references
        .iter()
        .find(|r| r.figure_id == figure_id)
        .unwrap_or_else(|| {
            let ids = figure_ids(references);
            panic!("figure '{figure_id}' not found. Available: {ids:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Dotted page levels in build order.
pub fn page_levels(book: &Book) -> Vec<String> {
    book.pages.iter().map(|p| p.level.to_string()).collect()
}

/// Output paths in build order.
pub fn page_paths(book: &Book) -> Vec<&str> {
    book.pages.iter().map(|p| p.output_path.as_str()).collect()
}

/// Figure ids in book order.
pub fn figure_ids(references: &[ImageReference]) -> Vec<&str> {
    references.iter().map(|r| r.figure_id.as_str()).collect()
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert that `html` contains `<figure id="{figure_id}">` exactly once.
pub fn assert_single_figure(html: &str, figure_id: &str) {
    let needle = format!(r#"<figure id="{figure_id}">"#);
    assert_eq!(
        html.matches(&needle).count(),
        1,
        "expected exactly one {needle} in:\n{html}"
    );
}
