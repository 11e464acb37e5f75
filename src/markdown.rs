//! Page rendering: markdown in, HTML segments out.
//!
//! Pages are parsed with pulldown-cmark and written with its HTML writer,
//! except for the parts the numbering core decides:
//!
//! - **Block images.** A paragraph whose only non-whitespace content is one
//!   image, or one link around one image, is offered to the core as a block
//!   image. A figure replaces the whole paragraph; a bare image stays in it.
//! - **Inline images.** Every other image, including images outside
//!   paragraphs (tight lists, headings, table cells), is offered as inline and
//!   comes back bare.
//! - **Registry placeholders.** A paragraph that reads exactly
//!   `{{ <variable_name> }}` becomes a [`Segment::Registry`] slot, filled in
//!   once the whole book has been walked.

use crate::figure::{ImageNode, LinkWrapper};
use crate::registry::PlaceholderId;
use crate::state::{BuildState, CaptionError, FinishedBuild};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

/// Piece of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Html(String),
    /// Registry list, rendered in the second pass.
    Registry(PlaceholderId),
}

/// A page after the first pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutput {
    pub segments: Vec<Segment>,
}

impl PageOutput {
    pub fn placeholders(&self) -> impl Iterator<Item = PlaceholderId> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Registry(id) => Some(*id),
            Segment::Html(_) => None,
        })
    }

    /// Final HTML with every placeholder listing the whole book.
    pub fn resolve(&self, finished: &FinishedBuild) -> String {
        self.join(|id| finished.render_placeholder(id).into_string())
    }

    /// HTML with placeholders listing only what was known when they were met.
    pub fn resolve_now(&self, state: &BuildState) -> String {
        self.join(|id| state.render_placeholder_now(id).into_string())
    }

    fn join(&self, mut registry: impl FnMut(PlaceholderId) -> String) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Html(html) => out.push_str(html),
                Segment::Registry(id) => {
                    out.push_str(&registry(*id));
                    out.push('\n');
                }
            }
        }
        out
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// First pass over one page. `state` must already be on this page.
pub fn render_page(markdown: &str, state: &mut BuildState) -> Result<PageOutput, CaptionError> {
    let events: Vec<Event<'_>> = Parser::new_ext(markdown, parser_options()).collect();
    let mut writer = SegmentWriter::default();

    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Paragraph) => {
                let end = matching_end(&events, i);
                render_paragraph(&events[i + 1..end], state, &mut writer)?;
                i = end + 1;
            }
            Event::Start(Tag::Image { .. }) => {
                let end = matching_end(&events, i);
                let node = image_node(&events[i..=end]).inline();
                writer.push_inline_html(state.render_image(&node)?.to_html());
                i = end + 1;
            }
            event => {
                writer.push(event.clone());
                i += 1;
            }
        }
    }

    Ok(writer.finish())
}

fn render_paragraph<'a>(
    body: &[Event<'a>],
    state: &mut BuildState,
    writer: &mut SegmentWriter<'a>,
) -> Result<(), CaptionError> {
    if let Some(variable) = state.registry_variable() {
        if is_placeholder(body, variable) {
            let id = state.placeholder()?;
            writer.push_registry(id);
            return Ok(());
        }
    }

    if let Some(node) = standalone_image(body) {
        let rendered = state.render_image(&node)?;
        if rendered.is_figure() {
            writer.push_block_html(rendered.to_html());
        } else {
            writer.push(Event::Start(Tag::Paragraph));
            writer.push_inline_html(rendered.to_html());
            writer.push(Event::End(TagEnd::Paragraph));
        }
        return Ok(());
    }

    writer.push(Event::Start(Tag::Paragraph));
    let mut i = 0;
    while i < body.len() {
        if let Event::Start(Tag::Image { .. }) = &body[i] {
            let end = matching_end(body, i);
            let node = image_node(&body[i..=end]).inline();
            writer.push_inline_html(state.render_image(&node)?.to_html());
            i = end + 1;
        } else {
            writer.push(body[i].clone());
            i += 1;
        }
    }
    writer.push(Event::End(TagEnd::Paragraph));
    Ok(())
}

/// Index of the `End` event closing the `Start` at `start`.
fn matching_end(events: &[Event<'_>], start: usize) -> usize {
    let mut depth = 0usize;
    for (offset, event) in events[start..].iter().enumerate() {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return start + offset;
                }
            }
            _ => {}
        }
    }
    events.len().saturating_sub(1)
}

fn is_blank(event: &Event<'_>) -> bool {
    match event {
        Event::Text(text) => text.trim().is_empty(),
        Event::SoftBreak | Event::HardBreak => true,
        _ => false,
    }
}

fn trim_blank<'e, 'a>(mut events: &'e [Event<'a>]) -> &'e [Event<'a>] {
    while events.first().is_some_and(is_blank) {
        events = &events[1..];
    }
    while events.last().is_some_and(is_blank) {
        events = &events[..events.len() - 1];
    }
    events
}

/// The one image this paragraph consists of, if it is a block image.
fn standalone_image(body: &[Event<'_>]) -> Option<ImageNode> {
    let body = trim_blank(body);
    match body.first()? {
        Event::Start(Tag::Image { .. }) if matching_end(body, 0) == body.len() - 1 => {
            Some(image_node(body))
        }
        Event::Start(Tag::Link {
            dest_url, title, ..
        }) if matching_end(body, 0) == body.len() - 1 => {
            let inner = trim_blank(&body[1..body.len() - 1]);
            match inner.first()? {
                Event::Start(Tag::Image { .. }) if matching_end(inner, 0) == inner.len() - 1 => {
                    Some(image_node(inner).linked(LinkWrapper {
                        href: dest_url.to_string(),
                        title: Some(title.to_string()).filter(|t| !t.is_empty()),
                    }))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// Build an image node from a `Start(Image)` … `End(Image)` span.
fn image_node(span: &[Event<'_>]) -> ImageNode {
    let (url, title) = match span.first() {
        Some(Event::Start(Tag::Image {
            dest_url, title, ..
        })) => (dest_url.to_string(), title.to_string()),
        _ => (String::new(), String::new()),
    };
    let alt: String = span
        .iter()
        .filter_map(|event| match event {
            Event::Text(text) | Event::Code(text) | Event::InlineMath(text) => Some(&**text),
            Event::SoftBreak | Event::HardBreak => Some(" "),
            _ => None,
        })
        .collect();
    ImageNode::new(url, alt).with_title(title)
}

/// Whether a paragraph is exactly `{{ variable }}`.
fn is_placeholder(body: &[Event<'_>], variable: &str) -> bool {
    let mut text = String::new();
    for event in body {
        match event {
            Event::Text(t) => text.push_str(t),
            Event::SoftBreak => text.push(' '),
            _ => return false,
        }
    }
    text.trim()
        .strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
        .is_some_and(|inner| inner.trim() == variable)
}

/// Accumulates pulldown events and flushes them to HTML around placeholders.
#[derive(Default)]
struct SegmentWriter<'a> {
    pending: Vec<Event<'a>>,
    segments: Vec<Segment>,
}

impl<'a> SegmentWriter<'a> {
    fn push(&mut self, event: Event<'a>) {
        self.pending.push(event);
    }

    fn push_inline_html(&mut self, html: String) {
        self.pending.push(Event::InlineHtml(CowStr::from(html)));
    }

    fn push_block_html(&mut self, mut html: String) {
        html.push('\n');
        self.pending.push(Event::Html(CowStr::from(html)));
    }

    fn push_registry(&mut self, id: PlaceholderId) {
        self.flush();
        self.segments.push(Segment::Registry(id));
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut out = String::new();
        html::push_html(&mut out, self.pending.drain(..));
        match self.segments.last_mut() {
            Some(Segment::Html(prev)) => prev.push_str(&out),
            _ => self.segments.push(Segment::Html(out)),
        }
    }

    fn finish(mut self) -> PageOutput {
        self.flush();
        PageOutput {
            segments: self.segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CaptionsConfig, ImageOverride};
    use crate::types::PageLevel;

    fn state(config: CaptionsConfig) -> BuildState {
        let mut state = BuildState::new(&config);
        state.begin_page(PageLevel::new(vec![1, 1]), "/index.html");
        state
    }

    fn render(markdown: &str) -> String {
        render_with(markdown, CaptionsConfig::default())
    }

    fn render_with(markdown: &str, config: CaptionsConfig) -> String {
        let mut state = state(config);
        let page = render_page(markdown, &mut state).unwrap();
        page.resolve(&state.finish()).trim().to_string()
    }

    #[test]
    fn content_without_images_is_untouched() {
        assert_eq!(render("# heading\n\nparagraph"), "<h1>heading</h1>\n<p>paragraph</p>");
    }

    #[test]
    fn standalone_image_becomes_figure() {
        assert_eq!(
            render("![bar](foo.jpg)"),
            r#"<figure id="fig1.1.1"><img src="foo.jpg" alt="bar"><figcaption>Figure: bar</figcaption></figure>"#
        );
    }

    #[test]
    fn title_attribute_is_preferred() {
        assert_eq!(
            render(r#"![alt text](img.jpg "title text")"#),
            r#"<figure id="fig1.1.1"><img src="img.jpg" alt="alt text" title="title text"><figcaption>Figure: title text</figcaption></figure>"#
        );
    }

    #[test]
    fn empty_alt_stays_in_paragraph() {
        assert_eq!(render("![](img.jpg)"), r#"<p><img src="img.jpg" alt=""></p>"#);
    }

    #[test]
    fn empty_title_falls_back_to_alt() {
        assert_eq!(
            render(r#"![bar](img.jpg "")"#),
            r#"<figure id="fig1.1.1"><img src="img.jpg" alt="bar"><figcaption>Figure: bar</figcaption></figure>"#
        );
    }

    #[test]
    fn inline_images_are_left_bare() {
        assert_eq!(
            render("foo ![bar](img.jpg)"),
            r#"<p>foo <img src="img.jpg" alt="bar"></p>"#
        );
        assert_eq!(
            render("![bar](img.jpg) bar"),
            r#"<p><img src="img.jpg" alt="bar"> bar</p>"#
        );
        assert_eq!(
            render("foo ![bar](img.jpg) bar"),
            r#"<p>foo <img src="img.jpg" alt="bar"> bar</p>"#
        );
    }

    #[test]
    fn multiple_images_in_paragraph_are_inline() {
        assert_eq!(
            render("![bar1](foo1.jpg)![bar2](foo2.jpg)"),
            r#"<p><img src="foo1.jpg" alt="bar1"><img src="foo2.jpg" alt="bar2"></p>"#
        );
    }

    #[test]
    fn image_inside_link_keeps_link_around_figure() {
        assert_eq!(
            render(
                r#"[![SPE Remoting Module](http://img.youtube.com/vi/fGvT8eDdWrg/0.jpg)](http://www.youtube.com/watch?v=fGvT8eDdWrg "Click for a quick demo")"#
            ),
            concat!(
                r#"<a href="http://www.youtube.com/watch?v=fGvT8eDdWrg" title="Click for a quick demo">"#,
                r#"<figure id="fig1.1.1"><img src="http://img.youtube.com/vi/fGvT8eDdWrg/0.jpg" alt="SPE Remoting Module">"#,
                r#"<figcaption>Figure: SPE Remoting Module</figcaption></figure></a>"#
            )
        );
    }

    #[test]
    fn linked_image_with_text_is_inline() {
        let html = render("see [![logo](logo.png)](https://example.com)");
        assert!(html.starts_with("<p>see <a href=\"https://example.com\">"));
        assert!(html.contains(r#"<img src="logo.png" alt="logo">"#));
        assert!(!html.contains("<figure"));
    }

    #[test]
    fn images_in_tight_lists_are_inline() {
        let html = render("- ![one](1.png)\n- ![two](2.png)");
        assert!(html.contains(r#"<li><img src="1.png" alt="one"></li>"#));
        assert!(!html.contains("<figure"));
    }

    #[test]
    fn alt_text_flattens_emphasis() {
        assert!(render("![a *big* `cat`](cat.png)").contains("<figcaption>Figure: a big cat</figcaption>"));
    }

    #[test]
    fn consecutive_figures_number_in_order() {
        let html = render("![third](third.jpg)\n\n![fourth](fourth.jpg)");
        assert_eq!(
            html,
            concat!(
                r#"<figure id="fig1.1.1"><img src="third.jpg" alt="third"><figcaption>Figure: third</figcaption></figure>"#,
                "\n",
                r#"<figure id="fig1.1.2"><img src="fourth.jpg" alt="fourth"><figcaption>Figure: fourth</figcaption></figure>"#
            )
        );
    }

    #[test]
    fn skip_override_then_next_slot() {
        let config = CaptionsConfig {
            images: [(
                "1.1.1".to_string(),
                ImageOverride {
                    skip: true,
                    ..ImageOverride::default()
                },
            )]
            .into(),
            ..CaptionsConfig::default()
        };
        let html = render_with("![a](a.jpg)\n\n![b](b.jpg)", config);
        assert!(html.starts_with(r#"<p><img src="a.jpg" alt="a"></p>"#));
        assert!(html.contains(r#"<figure id="fig1.1.2"><img src="b.jpg" alt="b">"#));
    }

    #[test]
    fn placeholder_ignored_without_variable_name() {
        assert_eq!(render("{{ pictures }}"), "<p>{{ pictures }}</p>");
    }

    #[test]
    fn placeholder_becomes_registry_segment() {
        let config = CaptionsConfig {
            variable_name: Some("pictures".to_string()),
            ..CaptionsConfig::default()
        };
        let mut state = state(config);
        let page = render_page("# Figures\n\n{{pictures}}\n\n![bar](foo.jpg)", &mut state).unwrap();
        assert_eq!(page.placeholders().count(), 1);
        assert!(matches!(page.segments[1], Segment::Registry(_)));

        // single pass: the figure after the placeholder is not listed yet
        assert!(!page.resolve_now(&state).contains("<li>"));

        let html = page.resolve(&state.finish());
        assert!(html.contains(
            r##"<ol class="image-captions-registry"><li><a href="/index.html#fig1.1.1">Figure: bar</a></li></ol>"##
        ));
    }

    #[test]
    fn placeholder_detection() {
        let text = |s: &'static str| vec![Event::Text(CowStr::from(s))];
        assert!(is_placeholder(&text("{{ pictures }}"), "pictures"));
        assert!(is_placeholder(&text("{{pictures}}"), "pictures"));
        assert!(!is_placeholder(&text("{{ pictures }} and more"), "pictures"));
        assert!(!is_placeholder(&text("{{ figures }}"), "pictures"));
        assert!(!is_placeholder(&text("pictures"), "pictures"));
    }

    #[test]
    fn missing_image_url_propagates() {
        let mut state = state(CaptionsConfig::default());
        let err = render_page("![bar]()", &mut state).unwrap_err();
        assert!(matches!(err, CaptionError::MissingSource { .. }));
    }
}
