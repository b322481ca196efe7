//! Post repository - discovery, filtering and ordering of posts

use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::error::ContentError;
use super::{ContentStore, Post, PostParser};
use crate::config::SiteConfig;
use crate::helpers;

/// Read-only queries over the content store
///
/// Nothing is cached: each call re-reads the directory.
pub struct PostRepository {
    store: ContentStore,
    parser: PostParser,
}

impl PostRepository {
    pub fn new(store: ContentStore, parser: PostParser) -> Self {
        Self { store, parser }
    }

    /// Repository for a site rooted at `base_dir`
    pub fn from_config(base_dir: &Path, config: &SiteConfig) -> Self {
        Self::new(
            ContentStore::from_config(base_dir, config),
            PostParser::from_config(config),
        )
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// All published posts, newest first
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    pub fn all_posts(&self) -> Vec<Post> {
        self.store.ensure_exists();

        let files = self.store.list_candidate_files();
        if files.is_empty() {
            return Vec::new();
        }

        let mut posts: Vec<Post> = files
            .par_iter()
            .filter_map(|file_name| {
                let slug = self.store.slug_for(file_name)?;
                let path = self.store.root().join(file_name);
                match self.read_post(slug, &path) {
                    Ok(post) => Some(post),
                    Err(e) => {
                        tracing::warn!("Skipping post {}: {}", slug, e);
                        None
                    }
                }
            })
            .filter(|post| post.published)
            .collect();

        sort_newest_first(&mut posts);
        tracing::debug!(
            "Loaded {} published posts from {:?}",
            posts.len(),
            self.store.root()
        );
        posts
    }

    /// A single published post, or `None`
    ///
    /// Missing, unpublished and unreadable posts all look the same to the
    /// caller; the reason for a failure only goes to the log.
    pub fn post_by_slug(&self, slug: &str) -> Option<Post> {
        match self.load_post(slug) {
            Ok(post) => post,
            Err(e) => {
                tracing::warn!("Error reading post {}: {}", slug, e);
                None
            }
        }
    }

    /// Like [`post_by_slug`](Self::post_by_slug) but keeps the failure reason
    pub fn load_post(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        self.store.ensure_exists();

        let Some(path) = self.store.path_for(slug) else {
            tracing::debug!("Rejected post slug {:?}", slug);
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let post = self.read_post(slug, &path)?;
        Ok(Some(post).filter(|p| p.published))
    }

    /// Every tag used by a published post, deduplicated and ascending
    pub fn all_tags(&self) -> Vec<String> {
        self.tag_counts().into_keys().collect()
    }

    /// Published post count per tag, ordered by tag
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        count_tags(&self.all_posts())
    }

    /// Published posts carrying `tag`, newest first
    pub fn posts_by_tag(&self, tag: &str) -> Vec<Post> {
        filter_by_tag(self.all_posts(), tag)
    }

    fn read_post(&self, slug: &str, path: &Path) -> Result<Post, ContentError> {
        let raw = fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parser
            .parse(slug, &raw)
            .map_err(|source| ContentError::FrontMatter {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Count how many posts carry each tag
pub fn count_tags(posts: &[Post]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for post in posts {
        for tag in &post.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Keep the posts carrying `tag`, preserving order
pub fn filter_by_tag(posts: Vec<Post>, tag: &str) -> Vec<Post> {
    posts.into_iter().filter(|p| p.has_tag(tag)).collect()
}

/// Sort by date, newest first
///
/// Dates that parse come first in reverse chronological order; the rest
/// follow in reverse string order. The sort is stable.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| compare_dates(&b.date, &a.date));
}

fn compare_dates(a: &str, b: &str) -> Ordering {
    (helpers::parse_date(a), a).cmp(&(helpers::parse_date(b), b))
}
