//! Post parser - turns one file's text into a `Post`

use super::error::FrontMatterError;
use super::post::UNTITLED;
use super::{FrontMatter, MarkdownRenderer, Post};
use crate::config::SiteConfig;
use crate::helpers;

/// Splits front-matter from the body and renders the body
pub struct PostParser {
    renderer: MarkdownRenderer,
}

impl PostParser {
    pub fn new(renderer: MarkdownRenderer) -> Self {
        Self { renderer }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(MarkdownRenderer::from_config(config))
    }

    /// Build a post from raw file text; `slug` comes from the file name
    pub fn parse(&self, slug: &str, raw: &str) -> Result<Post, FrontMatterError> {
        let (fm, body) = FrontMatter::parse(raw)?;
        let published = fm.is_published();

        let title = non_empty(fm.title).unwrap_or_else(|| UNTITLED.to_string());
        let date = non_empty(fm.date).unwrap_or_else(helpers::today);

        Ok(Post {
            slug: slug.to_string(),
            title,
            date,
            excerpt: non_empty(fm.excerpt),
            tags: fm.tags,
            published,
            content: self.renderer.render(body),
        })
    }
}

impl Default for PostParser {
    fn default() -> Self {
        Self::new(MarkdownRenderer::default())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
