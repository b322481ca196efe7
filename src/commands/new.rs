//! Create a new post

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::content::ContentStore;
use crate::helpers;
use crate::Blog;

#[derive(Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    date: String,
    excerpt: &'a str,
    tags: &'a [String],
}

/// Write a new post file and return its path
///
/// The slug defaults to the slugified title. Existing files are never
/// overwritten.
pub fn create_post(
    blog: &Blog,
    title: &str,
    slug: Option<&str>,
    tags: &[String],
) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => s.to_string(),
        None => slug::slugify(title),
    };

    let store = ContentStore::from_config(&blog.base_dir, &blog.config);
    let Some(file_path) = store.path_for(&slug) else {
        anyhow::bail!("Invalid post slug: {:?}", slug);
    };

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let front_matter = serde_yaml::to_string(&Scaffold {
        title,
        date: helpers::today(),
        excerpt: "",
        tags,
    })?;

    fs::create_dir_all(store.root())?;
    fs::write(&file_path, format!("---\n{}---\n\n", front_matter))?;

    tracing::info!("Created post {} at {:?}", slug, file_path);
    Ok(file_path)
}
