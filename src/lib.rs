//! # postmark
//!
//! A parser and renderer for a lightweight, wiki-style post markup. A post is a
//! metadata block followed by content lines; every construct is rendered by a
//! caller-supplied callback, so the same document can become HTML, plain text or
//! anything else.
//!
//! ## Quick Start
//!
//! ```rust
//! use postmark::{process, Render};
//!
//! let input = "++++\nTitle: Hello\nAuthor: Jane Doe\n++++\nThis is _italic_ text.\n";
//!
//! let render = Render::new()
//!     .italic(|text| format!("<i>{}</i>", text))
//!     .paragraph(|text| text.to_string());
//!
//! let post = process(input, Some(&render)).unwrap();
//! assert_eq!(post.content, "This is <i>italic</i> text.\n");
//! assert!(post.is_valid());
//! ```
//!
//! ## Syntax Reference
//!
//! ### Metadata
//!
//! ```text
//! ++++
//! Title: Post title
//! Name: my_unique_post
//! Author: John Doe
//! AuthorLink: https://www.domain.com
//! Date: 2015/09/24 22:18
//! Tags: tag1 tag2 tag3
//! Type: post
//! Protected: false
//! ++++
//! ```
//!
//! The format puts exactly one space after the colon; the parser also accepts
//! none or several.
//!
//! ### Blocks
//!
//! - Header: `h1. Text` to `h6. Text`
//! - Image: `!path/image.png|alt text! Optional *caption*`
//! - Paragraph: any other non-blank line
//!
//! ### Spans
//!
//! Applied in this order: `` `code` ``, `----` (rule), `*bold*`, `_italic_`,
//! `+underline+`, `-strikethrough-`, `^sup^`, `~sub~`, `!image.png|alt!`,
//! `[text|https://link]` and inline `{macro}`.
//!
//! ### Macros
//!
//! `{name}` or `{name:anonymous|key=value|flag}`. A multiline macro captures the
//! following lines as its body until the next line holding any macro tag, so
//! `{note}` ... `{end}` works, and so would `{note}` ... `{note}`.
//!
//! ## HTML
//!
//! Raw HTML tags fail with [`Error::HtmlNotAllowed`] unless
//! the render-level `allow_html` is set (or, inside a multiline macro body, the macro's
//! own `allow_html`). [`Render::html`] is a ready-made HTML configuration.

pub mod error;
pub mod macros;
pub mod parser;
pub mod post;
pub mod render;

pub use error::{Error, MacroError, MetadataError, Result};
pub use macros::{Macro, MacroHandler, Properties};
pub use post::{Metadata, Post};
pub use render::Render;

/// Parse a post document and render its content.
///
/// Fails on the first error; no partially rendered post is ever returned.
pub fn process(document: &str, render: Option<&Render>) -> Result<Post> {
    let render = render.ok_or(Error::RenderConfigMissing)?;

    if document.is_empty() {
        return Err(Error::EmptyDocument);
    }

    tracing::debug!(bytes = document.len(), macros = render.macros.len(), "Processing post");
    let post = parser::parse(document, render)?;
    tracing::debug!(title = %post.metadata.title, content_bytes = post.content.len(), "Post processed");

    Ok(post)
}
