//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::SiteConfig;

/// Markdown renderer with syntax highlighting
///
/// Rendering is a pure function of the markdown text; one renderer is shared
/// across all parallel parses.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
    sanitizer: Option<ammonia::Builder<'static>>,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", true, false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, highlight: bool, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            highlight,
            line_numbers,
            sanitizer: None,
        }
    }

    /// Create from the site configuration
    pub fn from_config(config: &SiteConfig) -> Self {
        let renderer = Self::with_options(
            &config.highlight.theme,
            config.highlight.enable,
            config.highlight.line_number,
        );
        if config.sanitize_html {
            renderer.sanitized()
        } else {
            renderer
        }
    }

    /// Clean every rendered document before returning it
    pub fn sanitized(mut self) -> Self {
        self.sanitizer = Some(build_sanitizer());
        self
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Front-matter is split off before this point, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|lang| lang.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let block = self.code_block(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(block)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        match &self.sanitizer {
            Some(sanitizer) => sanitizer.clean(&html_output).to_string(),
            None => html_output,
        }
    }

    /// Render a fenced or indented code block
    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        // The info string lands inside a class attribute
        let class = html_escape(lang);

        if self.highlight {
            if let Some(highlighted) = self.highlight_code(code, lang) {
                return if self.line_numbers {
                    add_line_numbers(&highlighted, &class, code.lines().count())
                } else {
                    format!(r#"<figure class="highlight {}">{}</figure>"#, class, highlighted)
                };
            }
        }

        format!(
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            class,
            html_escape(code)
        )
    }

    /// Highlight code with syntect, `None` if the theme is missing or highlighting fails
    fn highlight_code(&self, code: &str, lang: &str) -> Option<String> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())?;

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => Some(highlighted),
            Err(e) => {
                tracing::debug!("Highlighting {} block failed: {}", lang, e);
                None
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Add a line-number gutter beside highlighted code
fn add_line_numbers(highlighted: &str, class: &str, line_count: usize) -> String {
    let gutter = (1..=line_count)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        class, gutter, highlighted
    )
}

/// Sanitiser for untrusted post bodies; keeps what highlighting emits
fn build_sanitizer() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder
        .add_generic_attributes(&["class"])
        .add_tag_attributes("span", &["style"])
        .add_tag_attributes("pre", &["style"]);
    builder
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_lists_links_emphasis() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("- one\n- *two*\n\n[site](https://example.com) **bold**");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li><em>two</em></li>"));
        assert!(html.contains(r#"<a href="https://example.com">site</a>"#));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<figure class="highlight rust">"#));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_code_block_line_numbers() {
        let renderer = MarkdownRenderer::with_options("base16-ocean.dark", true, true);
        let html = renderer.render("```rust\nlet a = 1;\nlet b = 2;\n```");
        assert!(html.contains(r#"<span class="line-number">1</span>"#));
        assert!(html.contains(r#"<td class="gutter">"#));
    }

    #[test]
    fn test_code_block_info_string_escaped() {
        let info = "```\"><img src=x onerror=alert(1)>\nbody\n```";
        for renderer in [
            MarkdownRenderer::new(),
            MarkdownRenderer::with_options("base16-ocean.dark", true, true),
            MarkdownRenderer::with_options("base16-ocean.dark", false, false),
        ] {
            let html = renderer.render(info);
            assert!(!html.contains("<img"), "{}", html);
            assert!(html.contains("&quot;&gt;&lt;img"), "{}", html);
        }
    }

    #[test]
    fn test_code_block_without_highlighting_is_escaped() {
        let renderer = MarkdownRenderer::with_options("base16-ocean.dark", false, false);
        let html = renderer.render("```html\n<b>hi</b>\n```");
        assert!(html.contains(r#"<pre><code class="language-html">&lt;b&gt;hi&lt;/b&gt;"#));
    }

    #[test]
    fn test_indented_code_block() {
        let renderer = MarkdownRenderer::with_options("base16-ocean.dark", false, false);
        let html = renderer.render("Para\n\n    indented code\n");
        assert!(html.contains(r#"<pre><code class="language-text">indented code"#));
        assert!(!html.contains("<p>indented code"));
    }

    #[test]
    fn test_raw_html_passes_through_when_trusted() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("<script>alert(1)</script>\n\nText");
        assert!(html.contains("<script>"));
    }

    #[test]
    fn test_sanitized_strips_scripts() {
        let renderer = MarkdownRenderer::new().sanitized();
        let html = renderer.render("# Title\n\n<script>alert(1)</script>\n\n```rust\nfn main() {}\n```");
        assert!(!html.contains("<script>"));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("highlight"));
    }
}
