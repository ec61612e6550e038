//! Post and metadata definitions.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Post type used when the metadata block does not name one.
pub const DEFAULT_POST_TYPE: &str = "post";

/// A fully processed post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// Parsed metadata block
    pub metadata: Metadata,
    /// Rendered content, one block per line
    pub content: String,
}

impl Post {
    /// Check that the post carries the minimum needed for publishing:
    /// a title, an author and some content.
    pub fn is_valid(&self) -> bool {
        !self.metadata.author.is_empty()
            && !self.metadata.title.is_empty()
            && !self.content.is_empty()
    }
}

/// Post metadata from the `++++` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    /// Post title
    pub title: String,
    /// Unique post name
    pub name: String,
    /// Post author
    pub author: String,
    /// Link to the author's page
    pub author_link: String,
    /// Publication date (UTC)
    pub date: DateTime<Utc>,
    /// Tag list
    pub tags: Vec<String>,
    /// Lowercased post type
    #[serde(rename = "type")]
    pub post_type: String,
    /// Protected post flag
    pub protected: bool,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            name: String::new(),
            author: String::new(),
            author_link: String::new(),
            date: Utc::now(),
            tags: Vec::new(),
            post_type: DEFAULT_POST_TYPE.to_string(),
            protected: false,
        }
    }
}
