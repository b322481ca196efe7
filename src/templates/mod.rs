//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping stays on, so titles,
//! excerpts and tags are escaped; post content is rendered HTML and goes
//! through `| safe`.

use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{self, TagSlugs};

/// Renders every page of the site from repository results
pub struct PageRenderer {
    tera: Tera,
    config: SiteConfig,
}

impl PageRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("macros.html", include_str!("theme/macros.html")),
            ("home.html", include_str!("theme/home.html")),
            ("blog.html", include_str!("theme/blog.html")),
            ("post.html", include_str!("theme/post.html")),
            ("tags.html", include_str!("theme/tags.html")),
            ("404.html", include_str!("theme/404.html")),
        ])?;

        tera.register_filter("date_format", date_format_filter);

        Ok(Self {
            tera,
            config: config.clone(),
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Landing page
    pub fn render_home(&self) -> Result<String> {
        self.render("home.html", &self.base_context())
    }

    /// Listing of all published posts
    ///
    /// `tags` holds the slugs of every tag on the site, so tag links match
    /// the tag pages.
    pub fn render_blog(&self, posts: &[Post], tags: &TagSlugs) -> Result<String> {
        let mut context = self.base_context();
        context.insert("posts", &self.post_views(posts, tags));
        context.insert("tag", &None::<TagView>);
        self.render("blog.html", &context)
    }

    /// Listing of the posts carrying one tag
    pub fn render_tag(&self, tag: &str, posts: &[Post], tags: &TagSlugs) -> Result<String> {
        let mut context = self.base_context();
        context.insert("posts", &self.post_views(posts, tags));
        context.insert("tag", &Some(self.tag_view(tag, posts.len(), tags)));
        self.render("blog.html", &context)
    }

    /// Index of every tag with its post count
    pub fn render_tags(&self, counts: &BTreeMap<String, usize>) -> Result<String> {
        let slugs = TagSlugs::new(counts.keys());
        let tags: Vec<TagView> = counts
            .iter()
            .map(|(name, count)| self.tag_view(name, *count, &slugs))
            .collect();

        let mut context = self.base_context();
        context.insert("tags", &tags);
        self.render("tags.html", &context)
    }

    /// A single post
    pub fn render_post(&self, post: &Post, tags: &TagSlugs) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", &self.post_view(post, tags));
        self.render("post.html", &context)
    }

    /// The page shown for unknown, unpublished or unreadable posts
    pub fn render_not_found(&self) -> Result<String> {
        self.render("404.html", &self.base_context())
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteView::from_config(&self.config));
        context
    }

    fn post_views(&self, posts: &[Post], tags: &TagSlugs) -> Vec<PostView> {
        posts.iter().map(|p| self.post_view(p, tags)).collect()
    }

    fn post_view(&self, post: &Post, tags: &TagSlugs) -> PostView {
        let url = helpers::post_url(&self.config, &post.slug);
        PostView {
            slug: post.slug.clone(),
            permalink: helpers::full_url_for(&self.config, &url),
            url,
            title: post.title.clone(),
            date: post.date.clone(),
            excerpt: post.excerpt.clone(),
            tags: post.tags.iter().map(|t| self.tag_view(t, 0, tags)).collect(),
            content: post.content.clone(),
        }
    }

    fn tag_view(&self, name: &str, count: usize, tags: &TagSlugs) -> TagView {
        TagView {
            name: name.to_string(),
            url: helpers::tag_url(&self.config, &tags.slug(name)),
            count,
        }
    }
}

/// Tera filter: format date string
///
/// `format="LL"` renders "May 30, 2023"; anything else leaves the date as written.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    if format == "LL" {
        return Ok(tera::Value::String(helpers::long_date(&s)));
    }

    Ok(tera::Value::String(s))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
    pub title: String,
    pub description: String,
    pub author: String,
    pub root: String,
    pub blog_url: String,
    pub tags_url: String,
    pub year: i32,
}

impl SiteView {
    fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            root: helpers::url_for(config, ""),
            blog_url: helpers::blog_url(config),
            tags_url: helpers::tags_url(config),
            year: helpers::current_year(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub slug: String,
    pub url: String,
    pub permalink: String,
    pub title: String,
    pub date: String,
    pub excerpt: Option<String>,
    pub tags: Vec<TagView>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub name: String,
    pub url: String,
    pub count: usize,
}
