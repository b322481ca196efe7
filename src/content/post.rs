//! Post model

use serde::Serialize;

/// Title used when the front-matter has none
pub const UNTITLED: &str = "Untitled";

/// A blog post, built fresh from its source file on every query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// File name without extension; addresses the post
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date as written in the front-matter
    pub date: String,

    /// Short summary for listings
    pub excerpt: Option<String>,

    /// Post tags
    pub tags: Vec<String>,

    /// Whether the post is published
    pub published: bool,

    /// Rendered HTML content, emitted unescaped by the templates
    pub content: String,
}

impl Post {
    /// Whether the post carries `tag`, compared exactly
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
