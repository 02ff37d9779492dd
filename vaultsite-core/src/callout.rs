//! Obsidian callouts.
//!
//! ```text
//! > [!summary]+ Title
//! > content...
//! ```
//!
//! becomes a `div.callout.summary` holding a `div.callout-title` and a
//! `div.callout-body`. Everything else in the document is left alone.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::renderer::MarkdownRenderer;

/// Kind used for `> [!]` headers that carry no identifier.
pub const DEFAULT_KIND: &str = "note";

static CALLOUT_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*>\s*\[!(\w*)\][ \t]*[+-]?[ \t]*(.*?)\s*$").expect("valid callout regex")
});
static QUOTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*>\s?").expect("valid quote regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub kind: String,
    pub title: String,
    pub body: Vec<String>,
}

impl Callout {
    /// Parse a callout header line. The line must not carry its terminator.
    pub fn parse_header(line: &str) -> Option<Self> {
        let caps = CALLOUT_HEAD.captures(line)?;

        let kind = match caps[1].to_lowercase() {
            k if k.is_empty() => DEFAULT_KIND.to_string(),
            k => k,
        };
        let title = match caps[2].trim() {
            "" => kind.clone(),
            t => t.to_string(),
        };

        Some(Self {
            kind,
            title,
            body: Vec::new(),
        })
    }

    pub fn to_html(&self, renderer: &MarkdownRenderer) -> String {
        let body = self.body.join("\n");
        let body = body.trim();
        let body_html = if body.is_empty() {
            String::new()
        } else {
            fold_blank_lines(&renderer.render(body))
        };

        format!(
            "<div class=\"callout {}\">\n  <div class=\"callout-title\">{}</div>\n  <div class=\"callout-body\">\n{}  </div>\n</div>",
            html_escape::encode_double_quoted_attribute(&self.kind),
            html_escape::encode_text(&self.title),
            body_html,
        )
    }
}

/// Replace every callout in `content` with its HTML block.
///
/// Text without callouts is returned unchanged, byte for byte. Nested callouts
/// are not unwound: they end up as quoted text inside the outer body.
pub fn translate_callouts<'a>(content: &'a str, renderer: &MarkdownRenderer) -> Cow<'a, str> {
    let mut lines = content.split_inclusive('\n').peekable();
    let mut out = String::with_capacity(content.len());
    let mut found = false;

    while let Some(line) = lines.next() {
        let Some(mut callout) = Callout::parse_header(strip_line_end(line)) else {
            out.push_str(line);
            continue;
        };
        found = true;

        while let Some(&next) = lines.peek() {
            let next = strip_line_end(next);
            let Some(prefix) = QUOTE_PREFIX.find(next) else {
                break;
            };
            callout.body.push(next[prefix.end()..].to_string());
            lines.next();
        }

        // Blank lines around the block keep it out of neighbouring paragraphs.
        out.push('\n');
        out.push_str(&callout.to_html(renderer));
        out.push_str("\n\n");
    }

    if found {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(content)
    }
}

fn strip_line_end(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// A blank line would end the surrounding CommonMark HTML block early.
///
/// Empty lines become a `&#10;` on the previous line and whitespace-only lines
/// have their whitespace written as character references, which displays the
/// same inside `<pre>`. In `<script>` and `<style>` bodies references are not
/// decoded, so blank lines there are dropped instead.
fn fold_blank_lines(html: &str) -> String {
    let mut lines: Vec<Cow<'_, str>> = Vec::new();
    let mut raw_text = false;

    for line in html.lines() {
        if !line.trim().is_empty() {
            raw_text = in_raw_text(line, raw_text);
            lines.push(Cow::Borrowed(line));
        } else if raw_text {
            continue;
        } else if line.is_empty() {
            if let Some(last) = lines.last_mut() {
                last.to_mut().push_str("&#10;");
            }
        } else {
            let encoded: String = line.chars().map(|c| format!("&#{};", c as u32)).collect();
            lines.push(Cow::Owned(encoded));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Whether a `<script>` or `<style>` element is still open after `line`.
fn in_raw_text(line: &str, open: bool) -> bool {
    let line = line.to_ascii_lowercase();
    let opened = line.rfind("<script").max(line.rfind("<style"));
    let closed = line.rfind("</script").max(line.rfind("</style"));

    match (opened, closed) {
        (Some(o), Some(c)) => o > c,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (None, None) => open,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(content: &str) -> String {
        translate_callouts(content, &MarkdownRenderer::default()).into_owned()
    }

    #[test]
    fn test_well_formed_callout() {
        let out = translate("> [!tip] Title\n> line one\n> - item\n");
        assert_eq!(out.matches("class=\"callout ").count(), 1);
        assert!(out.contains("<div class=\"callout tip\">"));
        assert!(out.contains("<div class=\"callout-title\">Title</div>"));
        assert!(out.contains("<p>line one</p>"));
        assert!(out.contains("<li>item</li>"));
    }

    #[test]
    fn test_exact_block_shape() {
        let out = translate("before\n> [!info] Heads up\n> Body text\nafter\n");
        assert_eq!(
            out,
            "before\n\n<div class=\"callout info\">\n  <div class=\"callout-title\">Heads up</div>\n  <div class=\"callout-body\">\n<p>Body text</p>\n  </div>\n</div>\n\nafter\n"
        );
    }

    #[test]
    fn test_text_without_callouts_is_untouched() {
        for text in [
            "# Title\n\nSome text\n",
            "> plain quote\n> [not a directive]\n> [!bad directive]\n",
            "no trailing newline",
            "windows\r\nline endings\r\n",
            "",
        ] {
            let out = translate_callouts(text, &MarkdownRenderer::default());
            assert!(matches!(out, Cow::Borrowed(_)));
            assert_eq!(out, text);
        }
    }

    #[test]
    fn test_title_defaults_to_kind() {
        let out = translate("> [!warning]\n> Be careful");
        assert!(out.contains("<div class=\"callout warning\">"));
        assert!(out.contains("<div class=\"callout-title\">warning</div>"));
        assert!(out.contains("<p>Be careful</p>"));
    }

    #[test]
    fn test_header_variants() {
        let header = Callout::parse_header("  >   [!FAQ]- Why  bother? ").unwrap();
        assert_eq!(header.kind, "faq");
        assert_eq!(header.title, "Why  bother?");

        let header = Callout::parse_header("> [!summary]+").unwrap();
        assert_eq!(header.kind, "summary");
        assert_eq!(header.title, "summary");

        let header = Callout::parse_header("> [!]").unwrap();
        assert_eq!(header.kind, DEFAULT_KIND);

        assert!(Callout::parse_header("[!tip] not quoted").is_none());
        assert!(Callout::parse_header("> text [!tip]").is_none());
    }

    #[test]
    fn test_body_strips_one_marker_and_one_space() {
        let mut lines = "> [!quote]\n>  indented\n>>nested\n>\n> last"
            .split('\n')
            .map(str::to_string);
        let header = lines.next().unwrap();
        let mut callout = Callout::parse_header(&header).unwrap();
        for line in lines {
            let prefix = QUOTE_PREFIX.find(&line).unwrap();
            callout.body.push(line[prefix.end()..].to_string());
        }
        assert_eq!(callout.body, vec![" indented", ">nested", "", "last"]);
    }

    #[test]
    fn test_body_ends_at_unquoted_line() {
        let out = translate("> [!tip]\n> inside\n\noutside\n");
        let block_end = out.find("</div>\n</div>").unwrap();
        assert!(out[..block_end].contains("<p>inside</p>"));
        assert!(out[block_end..].contains("outside"));
        assert!(!out.contains("<p>outside</p>"));
    }

    #[test]
    fn test_unterminated_callout_at_end() {
        let out = translate("text\n> [!note]");
        assert!(out.contains("<div class=\"callout-body\">\n  </div>"));
    }

    #[test]
    fn test_nested_callout_is_flattened() {
        let out = translate("> [!note] Outer\n> > [!tip] Inner\n> > text\n");
        assert_eq!(out.matches("class=\"callout ").count(), 1);
        assert!(out.contains("callout note"));
        assert!(out.contains("<blockquote>"));
        assert!(out.contains("[!tip] Inner"));
    }

    #[test]
    fn test_title_is_literal_text() {
        let out = translate("> [!tip] Use <b> and *stars*\n> x\n");
        assert!(out.contains(
            "<div class=\"callout-title\">Use &lt;b&gt; and *stars*</div>"
        ));
    }

    #[test]
    fn test_code_with_blank_line_survives_outer_render() {
        let renderer = MarkdownRenderer::default();
        let text = "> [!example]\n> ```\n> a\n>\n> b\n> ```\n\nAfter\n";
        let html = renderer.render(&translate_callouts(text, &renderer));

        assert!(html.contains("<pre><code>a&#10;\nb\n</code></pre>"));
        assert!(html.contains("</div>\n</div>"));
        assert!(html.contains("<p>After</p>"));
    }

    #[test]
    fn test_whitespace_line_in_code_is_kept() {
        let renderer = MarkdownRenderer::default();
        let text = "> [!example]\n> ```\n> a\n>     \n> b\n> ```\n\nAfter\n";
        let html = renderer.render(&translate_callouts(text, &renderer));

        assert!(html.contains("<pre><code>a\n&#32;&#32;&#32;&#32;\nb\n</code></pre>"));
        assert!(html.contains("</div>\n</div>"));
        assert!(html.contains("<p>After</p>"));
    }

    #[test]
    fn test_script_in_body_gets_no_references() {
        let renderer = MarkdownRenderer::default();
        let text = "> [!note]\n> <script>\n> var a;\n>\n> var b;\n> </script>\n>\n> ```\n> x\n>\n> y\n> ```\n\nAfter\n";
        let translated = translate_callouts(text, &renderer);

        assert!(translated.contains("<script>\nvar a;\nvar b;\n</script>"));
        assert!(translated.contains("<pre><code>x&#10;\ny\n</code></pre>"));
        let html = renderer.render(&translated);
        assert!(html.contains("</div>\n</div>"));
        assert!(html.contains("<p>After</p>"));
    }

    #[test]
    fn test_raw_text_tracking() {
        assert!(in_raw_text("<script type=\"module\">", false));
        assert!(in_raw_text("<STYLE>", false));
        assert!(!in_raw_text("<style>p {}</style>", false));
        assert!(in_raw_text("let x = 1;", true));
        assert!(!in_raw_text("</script>", true));
        assert!(!in_raw_text("<p>plain</p>", false));
    }

    #[test]
    fn test_block_is_not_wrapped_in_paragraph() {
        let renderer = MarkdownRenderer::default();
        let html = renderer.render(&translate_callouts(
            "Intro\n> [!tip] T\n> body\nOutro\n",
            &renderer,
        ));
        assert!(html.contains("<p>Intro</p>\n<div class=\"callout tip\">"));
        assert!(html.contains("<p>Outro</p>"));
    }
}
