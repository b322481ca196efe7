//! Generator module - writes the site as static HTML files

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::content::repository::{count_tags, filter_by_tag};
use crate::content::{Post, PostRepository};
use crate::helpers::TagSlugs;
use crate::templates::PageRenderer;
use crate::Blog;

/// What a generation run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub posts: usize,
    pub tags: usize,
    pub assets: usize,
}

/// Static site generator using the built-in templates
pub struct Generator {
    blog: Blog,
    repository: PostRepository,
    renderer: PageRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            repository: blog.repository(),
            renderer: PageRenderer::new(&blog.config)?,
        })
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<GenerateSummary> {
        fs::create_dir_all(&self.blog.public_dir)?;

        // One listing feeds every page so the output is consistent
        let posts = self.repository.all_posts();
        let counts = count_tags(&posts);
        let slugs = TagSlugs::new(counts.keys());

        self.write_page(Path::new("index.html"), self.renderer.render_home()?)?;
        self.write_page(Path::new("404.html"), self.renderer.render_not_found()?)?;

        self.generate_blog_pages(&posts, &slugs)?;

        let tag_dir = self.blog.config.tag_dir.trim_matches('/');
        self.write_page(
            &Path::new(tag_dir).join("index.html"),
            self.renderer.render_tags(&counts)?,
        )?;
        // Slugs are plain `[a-z0-9-]` segments, unique per tag
        for tag in counts.keys() {
            let tagged = filter_by_tag(posts.clone(), tag);
            self.write_page(
                &Path::new(tag_dir).join(slugs.slug(tag)).join("index.html"),
                self.renderer.render_tag(tag, &tagged, &slugs)?,
            )?;
        }

        let assets = self.copy_static_assets()?;

        Ok(GenerateSummary {
            posts: posts.len(),
            tags: counts.len(),
            assets,
        })
    }

    /// Post listing plus one page per published post
    fn generate_blog_pages(&self, posts: &[Post], slugs: &TagSlugs) -> Result<()> {
        let blog_dir = Path::new(self.blog.config.blog_dir.trim_matches('/'));

        self.write_page(
            &blog_dir.join("index.html"),
            self.renderer.render_blog(posts, slugs)?,
        )?;

        for post in posts {
            let html = self.renderer.render_post(post, slugs)?;
            self.write_page(&blog_dir.join(&post.slug).join("index.html"), html)?;
        }

        Ok(())
    }

    fn write_page(&self, relative: &Path, html: String) -> Result<()> {
        let output_path = self.blog.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", relative);
        Ok(())
    }

    /// Copy the static directory into the output as-is
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest: PathBuf = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site() -> (TempDir, Blog) {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        fs::create_dir_all(&blog.content_dir).unwrap();
        fs::write(
            blog.content_dir.join("a.md"),
            "---\ntitle: A\ndate: 2024-03-01\ntags: [Rust Lang]\n---\n# Alpha",
        )
        .unwrap();
        fs::write(
            blog.content_dir.join("b.md"),
            "---\ntitle: B\ndate: 2024-02-01\npublished: false\ntags: [secret]\n---\nHidden",
        )
        .unwrap();
        (dir, blog)
    }

    #[test]
    fn test_generate_writes_pages() {
        let (_dir, blog) = site();
        let summary = Generator::new(&blog).unwrap().generate().unwrap();

        assert_eq!(
            summary,
            GenerateSummary {
                posts: 1,
                tags: 1,
                assets: 0
            }
        );

        let public = &blog.public_dir;
        assert!(public.join("index.html").is_file());
        assert!(public.join("404.html").is_file());
        assert!(public.join("blog/index.html").is_file());
        assert!(public.join("tags/index.html").is_file());
        assert!(public.join("tags/rust-lang/index.html").is_file());

        let post = fs::read_to_string(public.join("blog/a/index.html")).unwrap();
        assert!(post.contains("<h1>Alpha</h1>"));
    }

    #[test]
    fn test_unpublished_posts_not_generated() {
        let (_dir, blog) = site();
        Generator::new(&blog).unwrap().generate().unwrap();

        let public = &blog.public_dir;
        assert!(!public.join("blog/b").exists());
        assert!(!public.join("tags/secret").exists());

        let listing = fs::read_to_string(public.join("blog/index.html")).unwrap();
        assert!(!listing.contains("/blog/b/"));
    }

    #[test]
    fn test_punctuation_tags_stay_inside_tag_dir() {
        let (_dir, blog) = site();
        fs::write(
            blog.content_dir.join("dots.md"),
            "---\ntitle: Dots\ndate: 2024-01-01\ntags: ['..', '/', '.']\n---\nBody",
        )
        .unwrap();

        let summary = Generator::new(&blog).unwrap().generate().unwrap();
        assert_eq!(summary.tags, 4);

        let public = &blog.public_dir;
        let home = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(home.contains("Coming soon..."));
        assert!(public.join("tags/tag-2e2e/index.html").is_file());
        assert!(public.join("tags/tag-2f/index.html").is_file());
        assert!(public.join("tags/tag-2e/index.html").is_file());
    }

    #[test]
    fn test_colliding_tags_get_own_pages() {
        let (_dir, blog) = site();
        fs::write(
            blog.content_dir.join("c.md"),
            "---\ntitle: C\ndate: 2024-01-01\ntags: [rust-lang]\n---\nBody",
        )
        .unwrap();

        let summary = Generator::new(&blog).unwrap().generate().unwrap();
        assert_eq!(summary.tags, 2);

        let public = &blog.public_dir;
        let first = fs::read_to_string(public.join("tags/rust-lang/index.html")).unwrap();
        let second = fs::read_to_string(public.join("tags/rust-lang-2/index.html")).unwrap();
        assert!(first.contains(r#"href="/blog/a/""#));
        assert!(!first.contains(r#"href="/blog/c/""#));
        assert!(second.contains(r#"href="/blog/c/""#));
        assert!(!second.contains(r#"href="/blog/a/""#));
    }

    #[test]
    fn test_static_assets_copied() {
        let (_dir, blog) = site();
        fs::create_dir_all(blog.static_dir.join("img")).unwrap();
        fs::write(blog.static_dir.join("img/logo.svg"), "<svg/>").unwrap();
        fs::write(blog.static_dir.join("robots.txt"), "User-agent: *").unwrap();

        let summary = Generator::new(&blog).unwrap().generate().unwrap();
        assert_eq!(summary.assets, 2);
        assert!(blog.public_dir.join("img/logo.svg").is_file());
        assert!(blog.public_dir.join("robots.txt").is_file());
    }
}
