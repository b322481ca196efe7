//! URL helper functions

use percent_encoding::{AsciiSet, CONTROLS};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::SiteConfig;

/// Characters escaped inside one path segment; the result is safe to place
/// in an HTML attribute unescaped.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Path of a post page: `<root><blog_dir>/<slug>/`
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    url_for(
        config,
        &format!("{}/{}/", config.blog_dir.trim_matches('/'), encode_url(slug)),
    )
}

/// Path of the post listing: `<root><blog_dir>/`
pub fn blog_url(config: &SiteConfig) -> String {
    url_for(config, &format!("{}/", config.blog_dir.trim_matches('/')))
}

/// Path of a tag listing: `<root><tag_dir>/<slug>/`
///
/// `slug` comes from [`TagSlugs`], which keeps it unique among the site's tags.
pub fn tag_url(config: &SiteConfig, slug: &str) -> String {
    url_for(
        config,
        &format!("{}/{}/", config.tag_dir.trim_matches('/'), slug),
    )
}

/// Path of the tag index: `<root><tag_dir>/`
pub fn tags_url(config: &SiteConfig) -> String {
    url_for(config, &format!("{}/", config.tag_dir.trim_matches('/')))
}

/// URL-safe form of a tag name
///
/// The result only holds `[a-z0-9-]`, so it is also a safe directory name.
/// Tags made only of punctuation slugify to nothing; those are hex-encoded.
pub fn tag_slug(tag: &str) -> String {
    let slug = slug::slugify(tag);
    if !slug.is_empty() {
        return slug;
    }
    let hex: String = tag.bytes().map(|b| format!("{:02x}", b)).collect();
    format!("tag-{}", hex)
}

/// Slugs for every tag of a site, distinct even when tags slugify alike
///
/// Tags are assigned in sorted order; a taken slug gets a `-2`, `-3`, ...
/// suffix.
#[derive(Debug, Clone, Default)]
pub struct TagSlugs {
    slugs: BTreeMap<String, String>,
}

impl TagSlugs {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        let mut taken = HashSet::new();
        let mut slugs = BTreeMap::new();

        for tag in tags {
            let base = tag_slug(&tag);
            let mut slug = base.clone();
            let mut n = 2;
            while !taken.insert(slug.clone()) {
                slug = format!("{}-{}", base, n);
                n += 1;
            }
            slugs.insert(tag, slug);
        }

        Self { slugs }
    }

    /// Slug of `tag`; unknown tags get their plain slug
    pub fn slug(&self, tag: &str) -> String {
        match self.slugs.get(tag) {
            Some(slug) => slug.clone(),
            None => tag_slug(tag),
        }
    }

    /// The tag a URL segment points at
    pub fn tag_for(&self, slug: &str) -> Option<&str> {
        self.slugs
            .iter()
            .find(|(_, s)| s.as_str() == slug)
            .map(|(tag, _)| tag.as_str())
    }
}

/// Encode a single URL path segment
pub fn encode_url(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment, SEGMENT).to_string()
}
