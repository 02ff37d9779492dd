use pulldown_cmark::{Event, Options, Parser, html};

use crate::config::MarkdownConfig;
use crate::markdown::highlight_code_blocks;

/// Markdown to HTML fragment conversion shared by pages and callout bodies.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    syntax_theme: Option<String>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(&MarkdownConfig::default())
    }
}

impl MarkdownRenderer {
    pub fn new(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        if config.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if config.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if config.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if config.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }

        Self {
            options,
            syntax_theme: config.syntax_theme.clone(),
        }
    }

    /// Render `content` to an HTML fragment without any document wrapper.
    pub fn render(&self, content: &str) -> String {
        let parser = Parser::new_ext(content, self.options);

        let mut out = String::with_capacity(content.len() * 3 / 2);
        match &self.syntax_theme {
            Some(theme) => {
                let events: Vec<Event> = parser.collect();
                html::push_html(&mut out, highlight_code_blocks(events, theme).into_iter());
            }
            None => html::push_html(&mut out, parser),
        }

        out
    }
}
