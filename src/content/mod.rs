//! Content module - loads posts from the content directory
//!
//! Data flows one way: [`ContentStore`] finds files, [`PostParser`] turns
//! each into a [`Post`], [`PostRepository`] filters and orders them.

mod error;
mod frontmatter;
mod markdown;
mod parser;
mod post;
pub mod repository;
mod store;

pub use error::{ContentError, FrontMatterError};
pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use parser::PostParser;
pub use post::{Post, UNTITLED};
pub use repository::PostRepository;
pub use store::ContentStore;
