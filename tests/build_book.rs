//! End-to-end builds of small books written into a temp directory.
//!
//! Run with: cargo test --test build_book

use book_figures::book::{self, BookError};
use book_figures::generate::{self, FIGURES_FILE, RenderedBook};
use book_figures::types::ImageReference;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn render(root: &Path) -> RenderedBook {
    let book = book::scan(root).unwrap();
    generate::render_book(&book).unwrap()
}

fn rendered_figures(root: &Path) -> Vec<ImageReference> {
    render(root).figures.references().to_vec()
}

fn body<'a>(rendered: &'a RenderedBook, path: &str) -> &'a str {
    &rendered
        .page(path)
        .unwrap_or_else(|| panic!("page '{path}' not rendered"))
        .body
}

#[test]
fn book_numbers_follow_visit_order() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(
        root,
        "book.toml",
        "[image-captions]\ncaption = \"Image _BOOK_IMAGE_NUMBER_. - _CAPTION_\"\n",
    );
    write(root, "README.md", "# Intro\n\n![first](1.png)\n");
    write(root, "010-second/README.md", "# Second\n\n![second](2.png)\n");
    write(root, "010-second/010-sub.md", "# Sub\n\n![second a](2a.png)\n");
    write(
        root,
        "020-third.md",
        "# Third\n\n![third](3.png)\n\n![fourth](4.png)\n",
    );

    let rendered = render(root);
    assert!(body(&rendered, "index.html").contains(
        r#"<figure id="fig1.1.1"><img src="1.png" alt="first"><figcaption>Image 1. - first</figcaption></figure>"#
    ));
    assert!(body(&rendered, "second/index.html").contains(r#"<figure id="fig1.2.1">"#));
    assert!(body(&rendered, "second/index.html").contains("Image 2. - second"));
    assert!(body(&rendered, "second/sub.html").contains(r#"<figure id="fig1.2.1.1">"#));
    assert!(body(&rendered, "second/sub.html").contains("Image 3. - second a"));
    let third = body(&rendered, "third.html");
    assert!(third.contains(r#"<figure id="fig1.3.1"><img src="3.png" alt="third"><figcaption>Image 4. - third</figcaption></figure>"#));
    assert!(third.contains(r#"<figure id="fig1.3.2"><img src="4.png" alt="fourth"><figcaption>Image 5. - fourth</figcaption></figure>"#));
}

#[test]
fn per_image_overrides_from_book_toml() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(
        root,
        "book.toml",
        r#"
[image-captions]
align = "center"

[image-captions.attributes]
width = 300

[image-captions.images."1.1.2"]
caption = "Special _PAGE_LEVEL_._PAGE_IMAGE_NUMBER_: _CAPTION_"
align = "right"
attributes = { width = "400" }

[image-captions.images."1.1.3"]
skip = true

[image-captions.images."not-a-key"]
skip = true
"#,
    );
    write(
        root,
        "README.md",
        "# Intro\n\n![a](a.png)\n\n![b](b.png)\n\n![c](c.png)\n\n![d](d.png)\n",
    );

    let html = body(&render(root), "index.html").to_string();
    assert!(html.contains(
        r#"<figure id="fig1.1.1"><img src="a.png" alt="a" width="300"><figcaption class="center">Figure: a</figcaption></figure>"#
    ));
    assert!(html.contains(
        r#"<figure id="fig1.1.2"><img src="b.png" alt="b" width="400"><figcaption class="right">Special 1.1.2: b</figcaption></figure>"#
    ));
    assert!(html.contains(r#"<p><img src="c.png" alt="c"></p>"#));
    assert!(html.contains(r#"<figure id="fig1.1.4"><img src="d.png" alt="d" width="300">"#));
}

#[test]
fn registry_placeholder_lists_whole_book() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(
        root,
        "book.toml",
        "[image-captions]\nvariable_name = \"pictures\"\nlist_caption = \"List image _BOOK_IMAGE_NUMBER_: _CAPTION_\"\n",
    );
    write(root, "README.md", "# Intro\n\n{{ pictures }}\n");
    write(root, "010-one.md", "# One\n\n![first](1.png)\n");
    write(root, "020-two.md", "# Two\n\n![second](2.png \"Second title\")\n\n{{pictures}}\n");

    let rendered = render(root);
    let expected = concat!(
        r#"<ol class="image-captions-registry">"#,
        r##"<li><a href="/one.html#fig1.2.1">List image 1: first</a></li>"##,
        r##"<li><a href="/two.html#fig1.3.1">List image 2: Second title</a></li>"##,
        "</ol>"
    );
    assert!(body(&rendered, "index.html").contains(expected));
    assert!(body(&rendered, "two.html").contains(expected));
    assert_eq!(rendered.figures.placeholder_count(), 2);
    // captions are unaffected by list_caption
    assert!(body(&rendered, "one.html").contains("<figcaption>Figure: first</figcaption>"));
}

#[test]
fn builds_are_independent() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "README.md", "# Intro\n\n![only](1.png)\n");

    let first = render(root);
    let second = render(root);
    assert_eq!(body(&first, "index.html"), body(&second, "index.html"));
    assert_eq!(second.figures.references()[0].book_image_number, 1);
}

#[test]
fn bad_caption_values_fall_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(
        root,
        "book.toml",
        "[image-captions]\ncaption = 42\nvariable_name = \"\"\n",
    );
    write(root, "README.md", "# Intro\n\n![a](a.png)\n\n{{  }}\n");

    let html = body(&render(root), "index.html").to_string();
    assert!(html.contains("<figcaption>Figure: a</figcaption>"));
    assert!(html.contains("<p>{{  }}</p>"));
}

#[test]
fn invalid_toml_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "book.toml", "[image-captions\n");
    write(root, "README.md", "# Intro\n");
    assert!(matches!(book::scan(root), Err(BookError::Config(_))));
}

#[test]
fn build_writes_figures_manifest() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("book");
    write(&root, "book.toml", "title = \"Manual\"\n");
    write(&root, "README.md", "# Manual\n\n![cover](cover.png \"The cover\")\n");
    write(&root, "cover.png", "png");

    let out = tmp.path().join("dist");
    let book = book::scan(&root).unwrap();
    generate::build(&book, &out).unwrap();

    assert!(out.join("cover.png").is_file());
    let html = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(html.contains("<title>Manual</title>"));
    assert!(html.contains(r#"<figure id="fig1.1.1">"#));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(FIGURES_FILE)).unwrap()).unwrap();
    assert_eq!(manifest["figures"][0]["page_level"], serde_json::json!([1, 1]));

    let figures: Vec<ImageReference> =
        serde_json::from_value(manifest["figures"].clone()).unwrap();
    assert_eq!(figures.as_slice(), rendered_figures(&root).as_slice());
    let figure = &figures[0];
    assert_eq!(figure.source_url, "cover.png");
    assert_eq!(figure.alt_text, "cover");
    assert_eq!(figure.title_text, "The cover");
    assert_eq!(figure.rendered_caption, "Figure: The cover");
}
