//! List site content

use anyhow::Result;
use serde::Serialize;

use crate::Blog;

#[derive(Serialize)]
struct PostEntry<'a> {
    slug: &'a str,
    title: &'a str,
    date: &'a str,
    tags: &'a [String],
}

#[derive(Serialize)]
struct TagEntry<'a> {
    name: &'a str,
    count: usize,
}

/// List site content by type
pub fn run(blog: &Blog, content_type: &str, json: bool) -> Result<()> {
    print!("{}", render(blog, content_type, json)?);
    Ok(())
}

/// Build the listing text for `run`
pub fn render(blog: &Blog, content_type: &str, json: bool) -> Result<String> {
    let repository = blog.repository();
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts = repository.all_posts();
            if json {
                let entries: Vec<_> = posts
                    .iter()
                    .map(|p| PostEntry {
                        slug: &p.slug,
                        title: &p.title,
                        date: &p.date,
                        tags: &p.tags,
                    })
                    .collect();
                out.push_str(&serde_json::to_string_pretty(&entries)?);
                out.push('\n');
            } else {
                out.push_str(&format!("Posts ({}):\n", posts.len()));
                for post in &posts {
                    out.push_str(&format!("  {} - {} [{}]\n", post.date, post.title, post.slug));
                }
            }
        }
        "tag" | "tags" => {
            let counts = repository.tag_counts();
            if json {
                let entries: Vec<_> = counts
                    .iter()
                    .map(|(name, count)| TagEntry {
                        name,
                        count: *count,
                    })
                    .collect();
                out.push_str(&serde_json::to_string_pretty(&entries)?);
                out.push('\n');
            } else {
                out.push_str(&format!("Tags ({}):\n", counts.len()));
                for (tag, count) in &counts {
                    out.push_str(&format!("  {} ({})\n", tag, count));
                }
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(out)
}
