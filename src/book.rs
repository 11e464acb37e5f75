//! Book discovery.
//!
//! Walks a book directory and produces its pages in build order, each with the
//! page level figures on it are numbered under.
//!
//! ## Directory Structure
//!
//! ```text
//! book/
//! ├── book.toml                # Configuration (optional)
//! ├── README.md                # Introduction          → level 1.1
//! ├── 010-getting-started.md   # Chapter               → level 1.2
//! ├── 020-setup/               # Chapter with sections → level 1.3
//! │   ├── README.md            #   chapter page (optional)
//! │   ├── 010-linux.md         #   section             → level 1.3.1
//! │   └── 020-macos.md         #   section             → level 1.3.2
//! ├── 030-wrap-up.md           # Chapter               → level 1.4
//! └── images/                  # No markdown: copied as an asset directory
//!     └── diagram.png
//! ```
//!
//! ## Rules
//!
//! - Siblings are ordered by their `NNN-` prefix; unnumbered ones follow in
//!   name order.
//! - A directory is a chapter when it holds at least one `.md` file. Its own
//!   page is its `README.md`, or an empty page if there is none.
//! - Build order is depth-first: a chapter comes before its sections, and its
//!   sections before the next chapter.
//! - Hidden entries (`.` or `_` prefix) are ignored.

use crate::config::{self, BookConfig};
use crate::naming::{ParsedName, parse_entry_name};
use crate::types::PageLevel;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("No markdown pages found in {0}")]
    NoPages(PathBuf),
    #[error("{first} and {second} would both be written to {path}")]
    DuplicateOutput {
        path: String,
        first: String,
        second: String,
    },
}

#[derive(Debug)]
pub struct Book {
    pub root: PathBuf,
    pub config: BookConfig,
    /// Pages in build order.
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub level: PageLevel,
    /// Title from the first `# heading`, else derived from the file name.
    pub title: String,
    /// Markdown source relative to the book root. `None` for a chapter
    /// directory without a `README.md`.
    pub source_path: Option<PathBuf>,
    /// Output file relative to the site root, e.g. `setup/linux.html`.
    pub output_path: String,
    pub markdown: String,
}

impl Page {
    /// Where the page came from, for messages.
    pub fn source_label(&self) -> String {
        match &self.source_path {
            Some(path) => path.display().to_string(),
            None => format!("chapter {}", self.level),
        }
    }

    /// Site-absolute URL of the page.
    pub fn url(&self) -> String {
        format!("/{}", self.output_path)
    }
}

impl Book {
    pub fn page(&self, output_path: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.output_path == output_path)
    }
}

const README: &str = "README.md";

pub fn scan(root: &Path) -> Result<Book, BookError> {
    let config = config::load_config(root)?;
    let mut pages = Vec::new();

    let readme = root.join(README);
    if readme.is_file() {
        let markdown = fs::read_to_string(&readme)?;
        pages.push(Page {
            level: PageLevel::new(vec![1, 1]),
            title: heading_title(&markdown).unwrap_or_else(|| "Introduction".to_string()),
            source_path: Some(PathBuf::from(README)),
            output_path: "index.html".to_string(),
            markdown,
        });
    }

    // Chapters follow the introduction, which is always 1.1.
    scan_chapters(root, root, &PageLevel::new(vec![1]), 2, "", &mut pages)?;

    if pages.is_empty() {
        return Err(BookError::NoPages(root.to_path_buf()));
    }
    check_unique_outputs(&pages)?;

    Ok(Book {
        root: root.to_path_buf(),
        config,
        pages,
    })
}

fn scan_chapters(
    dir: &Path,
    root: &Path,
    parent: &PageLevel,
    first_index: u32,
    output_dir: &str,
    pages: &mut Vec<Page>,
) -> Result<(), BookError> {
    for (offset, (path, name)) in (0u32..).zip(collect_entries(dir)?) {
        let level = parent.child(first_index + offset);
        let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        let fallback_title = if name.title.is_empty() {
            name.slug.clone()
        } else {
            name.title.clone()
        };

        if path.is_dir() {
            let readme = path.join(README);
            let (markdown, source_path) = if readme.is_file() {
                (fs::read_to_string(&readme)?, Some(rel.join(README)))
            } else {
                (String::new(), None)
            };
            let child_dir = join_output(output_dir, &name.slug);
            pages.push(Page {
                title: heading_title(&markdown).unwrap_or(fallback_title),
                level: level.clone(),
                source_path,
                output_path: format!("{child_dir}/index.html"),
                markdown,
            });
            scan_chapters(&path, root, &level, 1, &child_dir, pages)?;
        } else {
            let markdown = fs::read_to_string(&path)?;
            pages.push(Page {
                title: heading_title(&markdown).unwrap_or(fallback_title),
                level,
                source_path: Some(rel),
                output_path: format!("{}.html", join_output(output_dir, &name.slug)),
                markdown,
            });
        }
    }
    Ok(())
}

/// Two pages with the same output path would overwrite each other.
fn check_unique_outputs(pages: &[Page]) -> Result<(), BookError> {
    let mut seen: HashMap<&str, &Page> = HashMap::new();
    for page in pages {
        if let Some(first) = seen.insert(page.output_path.as_str(), page) {
            return Err(BookError::DuplicateOutput {
                path: page.output_path.clone(),
                first: first.source_label(),
                second: page.source_label(),
            });
        }
    }
    Ok(())
}

fn join_output(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Chapter files and chapter directories of `dir`, in book order.
fn collect_entries(dir: &Path) -> Result<Vec<(PathBuf, ParsedName)>, BookError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if file_name.starts_with('.') || file_name.starts_with('_') || file_name == README {
            continue;
        }
        if path.is_dir() {
            if contains_markdown(&path)? {
                entries.push((path, parse_entry_name(&file_name)));
            }
        } else if is_markdown(&path) {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            entries.push((path, parse_entry_name(&stem)));
        }
    }
    entries.sort_by(|(_, a), (_, b)| a.book_order(b));
    Ok(entries)
}

fn is_markdown(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

fn contains_markdown(dir: &Path) -> Result<bool, BookError> {
    for entry in fs::read_dir(dir)? {
        if is_markdown(&entry?.path()) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Text of the first `# ` heading line.
fn heading_title(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .filter(|title| !title.is_empty())
}
