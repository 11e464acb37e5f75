//! Figure markup.
//!
//! Every image node ends up as one of two shapes:
//!
//! ```text
//! Bare    <img src="…" alt="…"[ title="…"]>
//! Figure  <figure id="fig1.2.1"><img …><figcaption[ class="…"]>…</figcaption></figure>
//! ```
//!
//! An image whose only parent is a link keeps that link, placed around the
//! whole figure rather than around the image inside it.

use crate::types::caption_body;
use maud::{Escaper, Markup, Render, html};
use std::fmt::Write;

/// Link whose sole content is the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkWrapper {
    pub href: String,
    pub title: Option<String>,
}

/// What the host knows about an image node when it visits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNode {
    pub url: String,
    pub alt_text: String,
    pub title_text: String,
    /// Shares its block with other non-whitespace content.
    pub is_inline: bool,
    pub link: Option<LinkWrapper>,
}

impl ImageNode {
    pub fn new(url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: alt_text.into(),
            title_text: String::new(),
            is_inline: false,
            link: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title_text = title.into();
        self
    }

    pub fn inline(mut self) -> Self {
        self.is_inline = true;
        self
    }

    pub fn linked(mut self, link: LinkWrapper) -> Self {
        self.link = Some(link);
        self
    }

    /// Title when present, otherwise alt.
    pub fn caption_body(&self) -> &str {
        caption_body(&self.alt_text, &self.title_text)
    }

    /// Why this node is left alone before any numbering happens, if it is.
    pub fn unnumbered_reason(&self) -> Option<BareReason> {
        if self.caption_body().trim().is_empty() {
            Some(BareReason::NoCaptionText)
        } else if self.is_inline {
            Some(BareReason::Inline)
        } else {
            None
        }
    }
}

/// Why an image was rendered without a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BareReason {
    /// Empty alt and title.
    NoCaptionText,
    Inline,
    /// A per-image override set `skip = true`.
    Configured,
    /// The caption template rendered to an empty string.
    EmptyCaption,
}

/// The `<img>` element itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    pub src: String,
    pub alt: String,
    pub title: Option<String>,
    /// Extra attributes in output order. `src`, `alt` and `title` are never
    /// repeated here.
    pub attributes: Vec<(String, String)>,
}

impl ImageTag {
    pub fn from_node(node: &ImageNode) -> Self {
        Self {
            src: node.url.clone(),
            alt: node.alt_text.clone(),
            title: Some(node.title_text.clone()).filter(|t| !t.trim().is_empty()),
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes<'a>(
        mut self,
        attributes: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        self.attributes = attributes
            .into_iter()
            .filter(|(name, _)| is_valid_attribute_name(name))
            .filter(|(name, _)| !matches!(name.as_str(), "src" | "alt" | "title"))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        self
    }
}

impl Render for ImageTag {
    fn render_to(&self, buffer: &mut String) {
        buffer.push_str("<img");
        push_attribute(buffer, "src", &self.src);
        push_attribute(buffer, "alt", &self.alt);
        if let Some(title) = &self.title {
            push_attribute(buffer, "title", title);
        }
        for (name, value) in &self.attributes {
            push_attribute(buffer, name, value);
        }
        buffer.push('>');
    }
}

fn push_attribute(buffer: &mut String, name: &str, value: &str) {
    buffer.push(' ');
    buffer.push_str(name);
    buffer.push_str("=\"");
    // Writing into a String can't fail.
    let _ = Escaper::new(buffer).write_str(value);
    buffer.push('"');
}

/// Attribute names come from user config and are written unescaped.
fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BareImage {
    pub image: ImageTag,
    pub link: Option<LinkWrapper>,
    pub reason: BareReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    pub id: String,
    pub image: ImageTag,
    pub caption: String,
    pub alignment: Option<String>,
    pub link: Option<LinkWrapper>,
}

/// Render outcome for one image node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Bare(BareImage),
    Figure(Figure),
}

impl Rendered {
    pub fn bare(node: &ImageNode, reason: BareReason) -> Self {
        Rendered::Bare(BareImage {
            image: ImageTag::from_node(node),
            link: node.link.clone(),
            reason,
        })
    }

    pub fn is_figure(&self) -> bool {
        matches!(self, Rendered::Figure(_))
    }

    pub fn link(&self) -> Option<&LinkWrapper> {
        match self {
            Rendered::Bare(bare) => bare.link.as_ref(),
            Rendered::Figure(figure) => figure.link.as_ref(),
        }
    }

    /// Markup without any link wrapper.
    pub fn inner_markup(&self) -> Markup {
        match self {
            Rendered::Bare(bare) => html! { (bare.image) },
            Rendered::Figure(figure) => html! {
                figure id=(figure.id) {
                    (figure.image)
                    figcaption class=[figure.alignment.as_deref()] { (figure.caption) }
                }
            },
        }
    }

    pub fn to_markup(&self) -> Markup {
        let inner = self.inner_markup();
        match self.link() {
            Some(link) => html! {
                a href=(link.href) title=[link.title.as_deref()] { (inner) }
            },
            None => inner,
        }
    }

    pub fn to_html(&self) -> String {
        self.to_markup().into_string()
    }
}

impl Render for Rendered {
    fn render(&self) -> Markup {
        self.to_markup()
    }
}
