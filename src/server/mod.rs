//! Preview server
//!
//! Pages are rendered on every request straight from the content directory,
//! so edits show up on reload without a rebuild.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::repository::{count_tags, filter_by_tag};
use crate::content::PostRepository;
use crate::helpers::{self, TagSlugs};
use crate::templates::PageRenderer;
use crate::Blog;

/// Server state
struct ServerState {
    repository: PostRepository,
    renderer: PageRenderer,
    static_dir: PathBuf,
}

/// Build the router for a site
pub fn router(blog: &Blog) -> Result<Router> {
    let state = Arc::new(ServerState {
        repository: blog.repository(),
        renderer: PageRenderer::new(&blog.config)?,
        static_dir: blog.static_dir.clone(),
    });

    let blog_dir = blog.config.blog_dir.trim_matches('/');
    let tag_dir = blog.config.tag_dir.trim_matches('/');

    let pages = Router::new()
        .route("/", get(home_page))
        .route(&format!("/{}", blog_dir), get(blog_page))
        .route(&format!("/{}/", blog_dir), get(blog_page))
        .route(&format!("/{}/:slug", blog_dir), get(post_page))
        .route(&format!("/{}/:slug/", blog_dir), get(post_page))
        .route(&format!("/{}", tag_dir), get(tags_page))
        .route(&format!("/{}/", tag_dir), get(tags_page))
        .route(&format!("/{}/:tag", tag_dir), get(tag_page))
        .route(&format!("/{}/:tag/", tag_dir), get(tag_page));

    // Nesting at "/" is not allowed, so a root-mounted site uses the routes as-is
    let root = blog.config.root.trim_matches('/');
    let app = if root.is_empty() {
        pages
    } else {
        Router::new().nest(&format!("/{}", root), pages)
    };

    Ok(app
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the preview server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let app = router(blog)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!(
        "Server running at http://{}:{}{}",
        ip,
        port,
        helpers::url_for(&blog.config, "")
    );
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

type PageResult = Result<(StatusCode, String)>;

/// Run a render on the blocking pool; repository reads are synchronous file I/O
async fn render_page<F>(state: Arc<ServerState>, render: F) -> Response
where
    F: FnOnce(&ServerState) -> PageResult + Send + 'static,
{
    match tokio::task::spawn_blocking(move || render(&state)).await {
        Ok(Ok((status, html))) => (status, Html(html)).into_response(),
        Ok(Err(e)) => {
            tracing::error!("Failed to render page: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
        Err(e) => {
            tracing::error!("Render task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

fn not_found(state: &ServerState) -> PageResult {
    Ok((StatusCode::NOT_FOUND, state.renderer.render_not_found()?))
}

async fn home_page(State(state): State<Arc<ServerState>>) -> Response {
    render_page(state, |state| {
        Ok((StatusCode::OK, state.renderer.render_home()?))
    })
    .await
}

async fn blog_page(State(state): State<Arc<ServerState>>) -> Response {
    render_page(state, |state| {
        let posts = state.repository.all_posts();
        let slugs = TagSlugs::new(count_tags(&posts).into_keys());
        Ok((StatusCode::OK, state.renderer.render_blog(&posts, &slugs)?))
    })
    .await
}

async fn post_page(State(state): State<Arc<ServerState>>, Path(slug): Path<String>) -> Response {
    render_page(state, move |state| match state.repository.post_by_slug(&slug) {
        Some(post) => {
            let slugs = TagSlugs::new(state.repository.all_tags());
            Ok((StatusCode::OK, state.renderer.render_post(&post, &slugs)?))
        }
        None => not_found(state),
    })
    .await
}

async fn tags_page(State(state): State<Arc<ServerState>>) -> Response {
    render_page(state, |state| {
        let counts = state.repository.tag_counts();
        Ok((StatusCode::OK, state.renderer.render_tags(&counts)?))
    })
    .await
}

async fn tag_page(State(state): State<Arc<ServerState>>, Path(segment): Path<String>) -> Response {
    render_page(state, move |state| {
        let posts = state.repository.all_posts();
        let counts = count_tags(&posts);
        let slugs = TagSlugs::new(counts.keys());

        // The URL carries the tag's slug; a raw tag name is accepted too
        let tag = match slugs.tag_for(&segment) {
            Some(tag) => tag.to_string(),
            None if counts.contains_key(&segment) => segment,
            None => return not_found(state),
        };

        let tagged = filter_by_tag(posts, &tag);
        Ok((StatusCode::OK, state.renderer.render_tag(&tag, &tagged, &slugs)?))
    })
    .await
}

/// Serve static assets, falling back to the not-found page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => render_page(state, not_found).await,
        Err(e) => {
            tracing::error!("Failed to serve static file: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tower::ServiceExt;

    fn site() -> (tempfile::TempDir, Blog) {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        fs::create_dir_all(&blog.content_dir).unwrap();
        fs::write(
            blog.content_dir.join("a.md"),
            "---\ntitle: Post A\ndate: 2024-03-01\ntags: [Rust Lang]\n---\n# Alpha",
        )
        .unwrap();
        fs::write(
            blog.content_dir.join("b.md"),
            "---\ntitle: Post B\ndate: 2024-02-01\npublished: false\n---\nHidden",
        )
        .unwrap();
        fs::create_dir_all(&blog.static_dir).unwrap();
        fs::write(blog.static_dir.join("robots.txt"), "User-agent: *").unwrap();
        (dir, blog)
    }

    async fn get_page(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_post_pages() {
        let (_dir, blog) = site();
        let app = router(&blog).unwrap();

        let (status, body) = get_page(app.clone(), "/blog/a/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Alpha</h1>"));

        let (status, _) = get_page(app.clone(), "/blog/a").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_page(app.clone(), "/blog/b/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Post Not Found"));
        assert!(!body.contains("Hidden"));

        let (status, _) = get_page(app, "/blog/missing/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_listing_pages() {
        let (_dir, blog) = site();
        let app = router(&blog).unwrap();

        let (status, body) = get_page(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Coming soon..."));

        let (status, body) = get_page(app.clone(), "/blog/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Post A"));
        assert!(!body.contains("Post B"));

        let (status, body) = get_page(app.clone(), "/tags/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Rust Lang"));

        let (status, body) = get_page(app.clone(), "/tags/rust-lang/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Post A"));

        let (status, _) = get_page(app, "/tags/unused/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_colliding_tag_pages() {
        let (_dir, blog) = site();
        fs::write(
            blog.content_dir.join("c.md"),
            "---\ntitle: Post C\ndate: 2024-01-01\ntags: [rust-lang]\n---\nGamma",
        )
        .unwrap();
        let app = router(&blog).unwrap();

        let (status, body) = get_page(app.clone(), "/tags/rust-lang/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Post A"));
        assert!(!body.contains("Post C"));

        let (status, body) = get_page(app.clone(), "/tags/rust-lang-2/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Post C"));
        assert!(!body.contains("Post A"));

        let (_, body) = get_page(app, "/blog/c/").await;
        assert!(body.contains(r#"href="/tags/rust-lang-2/""#));
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let (_dir, blog) = site();
        let app = router(&blog).unwrap();

        let (status, body) = get_page(app.clone(), "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "User-agent: *");

        let (status, body) = get_page(app, "/nowhere.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Post Not Found"));
    }

    #[tokio::test]
    async fn test_nested_root() {
        let (dir, _) = site();
        let mut blog = Blog::new(dir.path()).unwrap();
        blog.config.root = "/notes/".to_string();
        let app = router(&blog).unwrap();

        let (status, body) = get_page(app.clone(), "/notes/blog/a/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"href="/notes/blog/""#));

        let (status, _) = get_page(app, "/blog/a/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
