use std::borrow::Cow;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::MarkdownConfig;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

static HIGHLIGHT_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"==(.+?)==").expect("valid highlight regex"));

/// Title of a page: the text of the first level-1 heading that sits at the top
/// level of the document, or `fallback` when there is none.
///
/// Headings inside blockquotes, callouts and lists are not considered.
pub fn extract_title(content: &str, fallback: &str) -> String {
    let parser = Parser::new_ext(content, Options::ENABLE_TABLES);

    let mut depth = 0usize;
    let mut in_title = false;
    let mut text_buf = String::new();
    for event in parser {
        match event {
            Event::Start(Tag::Heading { level: HeadingLevel::H1, .. }) if depth == 0 => {
                in_title = true;
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if in_title => {
                let title = text_buf.trim();
                if !title.is_empty() {
                    return title.to_string();
                }
                text_buf.clear();
                in_title = false;
            }
            Event::Start(Tag::BlockQuote(_) | Tag::List(_) | Tag::Item) => depth += 1,
            Event::End(TagEnd::BlockQuote(_) | TagEnd::List(_) | TagEnd::Item) => {
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) | Event::Code(text) if in_title => text_buf.push_str(&text),
            Event::SoftBreak | Event::HardBreak if in_title => text_buf.push(' '),
            _ => continue,
        };
    }

    fallback.to_string()
}

/// Vault-specific text fixes applied before rendering.
pub fn cleanup<'a>(content: &'a str, config: &MarkdownConfig) -> Cow<'a, str> {
    let mut out = Cow::Borrowed(content);

    if config.normalize_breaks && out.contains("</br") {
        out = Cow::Owned(
            out.replace("</br />", "<br>")
                .replace("</br/>", "<br>")
                .replace("</br>", "<br>"),
        );
    }

    if config.highlight_marks && HIGHLIGHT_MARK.is_match(&out) {
        out = Cow::Owned(
            HIGHLIGHT_MARK
                .replace_all(&out, "<mark>$1</mark>")
                .into_owned(),
        );
    }

    out
}

/// Replace fenced code blocks with syntect output.
///
/// Blocks without a language, or with a language syntect does not know, are
/// emitted as plain escaped `<pre><code>`.
pub fn highlight_code_blocks<'a>(events: Vec<Event<'a>>, theme_name: &str) -> Vec<Event<'a>> {
    let Some(theme) = THEME_SET.themes.get(theme_name) else {
        tracing::warn!(theme = theme_name, "unknown syntax theme, highlighting disabled");
        return events;
    };

    let mut processed_events = Vec::with_capacity(events.len());
    let mut events = events.into_iter();

    while let Some(event) = events.next() {
        let lang = match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => lang,
            other => {
                processed_events.push(other);
                continue;
            }
        };

        // Collect all text events until the end of the code block
        let mut code_content = String::new();
        for inner in events.by_ref() {
            match inner {
                Event::End(TagEnd::CodeBlock) => break,
                Event::Text(text) => code_content.push_str(&text),
                _ => {}
            }
        }

        let token = lang.split_whitespace().next().unwrap_or_default();
        let syntax = if token.is_empty() {
            None
        } else {
            SYNTAX_SET.find_syntax_by_token(token).or_else(|| match token {
                // Fallback mappings for unsupported languages
                "nix" => SYNTAX_SET.find_syntax_by_name("JavaScript"),
                "toml" => SYNTAX_SET.find_syntax_by_name("YAML"),
                _ => None,
            })
        };

        let plain = || {
            format!(
                "<pre><code>{}</code></pre>\n",
                html_escape::encode_text(&code_content)
            )
        };
        let highlighted_html = match syntax {
            Some(syntax) => highlighted_html_for_string(&code_content, &SYNTAX_SET, syntax, theme)
                .unwrap_or_else(|_| plain()),
            None => plain(),
        };

        processed_events.push(Event::Html(highlighted_html.into()));
    }

    processed_events
}
