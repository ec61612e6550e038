//! Parser for post documents: metadata block first, then content lines.

mod block;
mod inline;
mod lexer;

pub use block::render_blocks;
pub use inline::{check_html, contains_html, render_inline};

use crate::error::{MetadataError, Result};
use crate::macros::MacroRegistry;
use crate::post::{Metadata, Post};
use crate::render::{Constructs, Render};
use chrono::NaiveDateTime;
use lexer::{metadata_delimiter, metadata_field};
use std::str::Lines;

/// Date format used by the `date` metadata field.
pub const DATE_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Shared state for rendering one document.
pub struct Context<'a> {
    pub render: &'a Render,
    pub constructs: Constructs,
    pub macros: &'a MacroRegistry<'a>,
}

impl<'a> Context<'a> {
    pub fn new(render: &'a Render, macros: &'a MacroRegistry<'a>) -> Self {
        Self {
            render,
            constructs: Constructs::from_render(render),
            macros,
        }
    }

    /// Output for a macro name with no definition.
    pub fn unsupported_macro(&self, name: &str) -> String {
        self.render
            .unsupported_macro
            .as_ref()
            .map_or_else(String::new, |f| f(name))
    }
}

/// Parse and render a complete document.
pub fn parse(input: &str, render: &Render) -> Result<Post> {
    let mut lines = input.lines();
    let metadata = parse_metadata(&mut lines)?;

    let macros = MacroRegistry::new(&render.macros);
    let ctx = Context::new(render, &macros);
    let content = render_blocks(lines, &ctx)?;

    Ok(Post { metadata, content })
}

/// Consume lines up to and including the closing metadata delimiter.
fn parse_metadata(lines: &mut Lines<'_>) -> Result<Metadata> {
    if !lines.any(|line| metadata_delimiter(line).is_ok()) {
        return Err(MetadataError::Missing.into());
    }

    let mut metadata = Metadata::default();

    for line in lines.by_ref() {
        if metadata_delimiter(line).is_ok() {
            tracing::trace!(title = %metadata.title, "Parsed metadata block");
            return Ok(metadata);
        }
        apply_field(&mut metadata, line)?;
    }

    Err(MetadataError::Missing.into())
}

fn apply_field(metadata: &mut Metadata, line: &str) -> Result<()> {
    let (_, (key, value)) =
        metadata_field(line).map_err(|_| MetadataError::Malformed(line.to_string()))?;

    match key.to_lowercase().as_str() {
        "title" => metadata.title = value.to_string(),
        "name" => metadata.name = value.to_string(),
        "author" => metadata.author = value.to_string(),
        "authorlink" => metadata.author_link = value.to_string(),
        "date" => {
            let date = NaiveDateTime::parse_from_str(value, DATE_FORMAT)
                .map_err(|e| MetadataError::InvalidDate(value.to_string(), e))?;
            metadata.date = date.and_utc();
        }
        "tags" => metadata.tags = value.split_whitespace().map(String::from).collect(),
        "type" => metadata.post_type = value.to_lowercase(),
        "protected" => metadata.protected = value.eq_ignore_ascii_case("true"),
        _ => return Err(MetadataError::UnsupportedProperty(key.to_string()).into()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;

    fn metadata(input: &str) -> Result<Metadata> {
        parse_metadata(&mut input.lines())
    }

    #[test]
    fn test_all_fields() {
        let input = "++++\n\
                     Title: Post title\n\
                     Name: my_unique_post\n\
                     Author: John Doe\n\
                     AuthorLink: https://www.domain.com\n\
                     Date: 2015/09/24 22:18\n\
                     Tags: tag1 tag2   tag3\n\
                     Type: My-Super-Type\n\
                     Protected: TRUE\n\
                     ++++\n";

        let meta = metadata(input).unwrap();
        assert_eq!(meta.title, "Post title");
        assert_eq!(meta.name, "my_unique_post");
        assert_eq!(meta.author, "John Doe");
        assert_eq!(meta.author_link, "https://www.domain.com");
        assert_eq!(meta.date.timestamp(), 1443133080);
        assert_eq!((meta.date.year(), meta.date.hour()), (2015, 22));
        assert_eq!(meta.tags, vec!["tag1", "tag2", "tag3"]);
        assert_eq!(meta.post_type, "my-super-type");
        assert!(meta.protected);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let meta = metadata("++++\nTITLE: Upper\nauthor: lower\n++++").unwrap();
        assert_eq!(meta.title, "Upper");
        assert_eq!(meta.author, "lower");
        assert_eq!(meta.post_type, "post");
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let meta = metadata("++++\nTitle: Rust: a tour\n++++").unwrap();
        assert_eq!(meta.title, "Rust: a tour");
    }

    #[test]
    fn test_lines_before_block_are_skipped() {
        let mut lines = "junk\n++++\nTitle: T\n++++\nBody".lines();
        let meta = parse_metadata(&mut lines).unwrap();
        assert_eq!(meta.title, "T");
        assert_eq!(lines.next(), Some("Body"));
    }

    #[test]
    fn test_missing_block() {
        assert!(matches!(
            metadata("Just text\n"),
            Err(Error::Metadata(MetadataError::Missing))
        ));
        assert!(matches!(
            metadata("++++\nTitle: T\n"),
            Err(Error::Metadata(MetadataError::Missing))
        ));
    }

    #[test]
    fn test_malformed_line() {
        assert!(matches!(
            metadata("++++\nTitle\n++++"),
            Err(Error::Metadata(MetadataError::Malformed(_)))
        ));
        assert!(matches!(
            metadata("++++\nTitle:\n++++"),
            Err(Error::Metadata(MetadataError::Malformed(_)))
        ));
    }

    #[test]
    fn test_unsupported_property() {
        match metadata("++++\nColor: red\n++++") {
            Err(Error::Metadata(MetadataError::UnsupportedProperty(key))) => {
                assert_eq!(key, "Color")
            }
            other => panic!("Expected unsupported property, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_date() {
        assert!(matches!(
            metadata("++++\nDate: 24.09.2015\n++++"),
            Err(Error::Metadata(MetadataError::InvalidDate(..)))
        ));
    }
}
