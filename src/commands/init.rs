//! Initialize a new blog site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::helpers;

const WELCOME_POST: &str = r#"Welcome! This post lives in a markdown file in the content directory.

## Writing posts

Every `.md` file in the content directory is a post. The file name is the
post's address, so `hello-world.md` is served at `/blog/hello-world/`.

The block between the `---` lines at the top is front-matter:

- `title`, `date` and `excerpt` are shown in listings
- `tags` groups posts on the tag pages
- `published: false` hides a post everywhere

```rust
fn main() {
    println!("Hello, world!");
}
```
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config = SiteConfig::default();

    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join(&config.content_dir))?;
    fs::create_dir_all(target_dir.join(&config.static_dir))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::info!("Keeping existing {:?}", config_path);
    } else {
        let content = format!(
            "# mdblog configuration\n\n{}",
            serde_yaml::to_string(&config)?
        );
        fs::write(&config_path, content)?;
    }

    let welcome_path = target_dir.join(&config.content_dir).join("hello-world.md");
    if !welcome_path.exists() {
        let front_matter = format!(
            "---\ntitle: Hello World\ndate: {}\nexcerpt: Your first post.\ntags: [welcome]\n---\n\n",
            helpers::today()
        );
        fs::write(&welcome_path, front_matter + WELCOME_POST)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Blog;

    #[test]
    fn test_init_creates_working_site() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("site");

        init_site(&target).unwrap();
        assert!(target.join("_config.yml").is_file());
        assert!(target.join("static").is_dir());

        let blog = Blog::new(&target).unwrap();
        assert_eq!(blog.config.title, "My Blog");

        let repo = blog.repository();
        let posts = repo.all_posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "hello-world");
        assert_eq!(posts[0].tags, vec!["welcome"]);
        assert!(posts[0].content.contains("<h2>Writing posts</h2>"));
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Mine\n").unwrap();

        init_site(dir.path()).unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "Mine");
    }
}
