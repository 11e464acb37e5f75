//! Caption template expansion.
//!
//! Templates are plain strings with placeholder tokens:
//!
//! | Token | Replaced with |
//! |-------|---------------|
//! | `_CAPTION_` | image title, or alt text when the title is blank |
//! | `_PAGE_LEVEL_` | dotted page level, e.g. `1.2` |
//! | `_PAGE_IMAGE_NUMBER_` | position of the image on its page |
//! | `_BOOK_IMAGE_NUMBER_` | position of the image in the whole book |
//!
//! Expansion is a single left-to-right pass: substituted text is never scanned
//! again, so an alt text that happens to contain `_PAGE_LEVEL_` comes out
//! verbatim. Tokens are case-sensitive and anything unrecognized is copied
//! through unchanged.

use crate::position::Position;
use crate::types::PageLevel;

/// Values available to a caption template.
#[derive(Debug, Clone, Copy)]
pub struct CaptionContext<'a> {
    pub body: &'a str,
    pub page_level: &'a PageLevel,
    pub page_image_number: u32,
    pub book_image_number: u32,
}

impl<'a> CaptionContext<'a> {
    pub fn new(body: &'a str, position: &'a Position) -> Self {
        Self {
            body,
            page_level: &position.page_level,
            page_image_number: position.page_image_number,
            book_image_number: position.book_image_number,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Caption,
    PageLevel,
    PageImageNumber,
    BookImageNumber,
}

const TOKENS: &[(&str, Token)] = &[
    ("_CAPTION_", Token::Caption),
    ("_PAGE_LEVEL_", Token::PageLevel),
    ("_PAGE_IMAGE_NUMBER_", Token::PageImageNumber),
    ("_BOOK_IMAGE_NUMBER_", Token::BookImageNumber),
];

/// Expand `template` for one image. An empty template yields an empty string.
pub fn render_caption(template: &str, ctx: &CaptionContext<'_>) -> String {
    let mut out = String::with_capacity(template.len() + ctx.body.len());
    let mut rest = template;

    while let Some(idx) = rest.find('_') {
        out.push_str(&rest[..idx]);
        let candidate = &rest[idx..];
        match TOKENS
            .iter()
            .find(|(literal, _)| candidate.starts_with(literal))
        {
            Some((literal, token)) => {
                match token {
                    Token::Caption => out.push_str(ctx.body),
                    Token::PageLevel => out.push_str(&ctx.page_level.to_string()),
                    Token::PageImageNumber => out.push_str(&ctx.page_image_number.to_string()),
                    Token::BookImageNumber => out.push_str(&ctx.book_image_number.to_string()),
                }
                rest = &candidate[literal.len()..];
            }
            None => {
                out.push('_');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
