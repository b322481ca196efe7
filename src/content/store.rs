//! Content store - the directory of post files

use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SiteConfig;

/// A flat directory of `*.<extension>` post files
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    extension: String,
}

impl ContentStore {
    /// Create a store over `root`, recognising files ending in `.<extension>`
    pub fn new<P: Into<PathBuf>>(root: P, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// The store configured for a site rooted at `base_dir`
    pub fn from_config(base_dir: &Path, config: &SiteConfig) -> Self {
        Self::new(base_dir.join(&config.content_dir), &config.extension)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Create the directory tree if missing. Failures are logged, never returned.
    pub fn ensure_exists(&self) {
        if self.root.is_dir() {
            return;
        }
        match fs::create_dir_all(&self.root) {
            Ok(()) => tracing::debug!("Created content directory {:?}", self.root),
            Err(e) => tracing::warn!("Failed to create content directory {:?}: {}", self.root, e),
        }
    }

    /// Names of the post files directly inside the store, sorted by name
    pub fn list_candidate_files(&self) -> Vec<String> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| self.slug_for(name).is_some())
            .collect()
    }

    /// Slug for a file name, `None` unless it ends in `.<extension>`
    pub fn slug_for<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        file_name
            .strip_suffix(self.extension.as_str())
            .and_then(|stem| stem.strip_suffix('.'))
            .filter(|stem| is_plain_component(stem))
    }

    /// Expected file path for a slug
    ///
    /// Returns `None` for anything but a single plain path component, so a
    /// lookup can never leave the store.
    pub fn path_for(&self, slug: &str) -> Option<PathBuf> {
        if !is_plain_component(slug) {
            return None;
        }
        Some(self.root.join(format!("{}.{}", slug, self.extension)))
    }
}

/// A single normal path component: not empty, `.`, `..` or separated
fn is_plain_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}
