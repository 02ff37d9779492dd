use std::path::Path;

use tera::{Context, Tera};
use thiserror::Error;

use crate::config::SiteConfig;

const PAGE_TEMPLATE: &str = "page.html";

/// The document shell every page is wrapped in.
pub const DEFAULT_PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="{{ lang }}">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{{ title }}</title>
  <link rel="stylesheet" href="{{ stylesheet }}">
</head>
<body>
  <div class="bg"></div>
  <main class="wrap content">
    <article class="card">
      <div class="md">{{ content }}</div>
    </article>
  </main>
</body>
</html>"#;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wraps rendered fragments in a full HTML document.
///
/// Receives `title`, `lang`, `stylesheet` and `content`. Values are escaped
/// here rather than by tera, whose escaper also rewrites `/` in paths. Only
/// `content` is inserted as is.
pub struct PageTemplate {
    tera: Tera,
    context: Context,
}

impl PageTemplate {
    pub fn new(site: &SiteConfig) -> Result<Self, TemplateError> {
        let source = match &site.template {
            Some(path) => std::fs::read_to_string(path)?,
            None => DEFAULT_PAGE_TEMPLATE.to_string(),
        };

        Self::from_source(&source, site)
    }

    pub fn from_source(source: &str, site: &SiteConfig) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.add_raw_template(PAGE_TEMPLATE, source)?;

        let mut context = Context::new();
        context.insert(
            "lang",
            &html_escape::encode_double_quoted_attribute(&site.lang),
        );
        context.insert(
            "stylesheet",
            &html_escape::encode_double_quoted_attribute(&site.stylesheet),
        );

        Ok(Self { tera, context })
    }

    /// Render a complete document for one page.
    pub fn assemble(&self, title: &str, body_html: &str) -> Result<String, TemplateError> {
        let mut context = self.context.clone();
        context.insert("title", &html_escape::encode_text(title));
        context.insert("content", body_html);

        Ok(self.tera.render(PAGE_TEMPLATE, &context)?)
    }

    /// Render a page and write it, creating parent directories as needed.
    pub fn assemble_to_file(
        &self,
        title: &str,
        body_html: &str,
        output_path: &Path,
    ) -> Result<(), TemplateError> {
        let rendered = self.assemble(title, body_html)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(output_path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shell() {
        let template = PageTemplate::new(&SiteConfig::default()).unwrap();
        let html = template.assemble("Home", "<p>Hello</p>\n").unwrap();

        assert!(html.starts_with("<!doctype html>\n<html lang=\"en\">"));
        assert!(html.contains("<meta charset=\"utf-8\" />"));
        assert!(html.contains("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />"));
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains("<link rel=\"stylesheet\" href=\"/assets/style.css\">"));
        assert!(html.contains("<div class=\"md\"><p>Hello</p>\n</div>"));
        assert!(html.contains("<main class=\"wrap content\">"));
        assert!(html.contains("<article class=\"card\">"));
    }

    #[test]
    fn test_title_is_escaped_body_is_not() {
        let template = PageTemplate::new(&SiteConfig::default()).unwrap();
        let html = template.assemble("Q&A <draft>", "<em>x</em>").unwrap();

        assert!(html.contains("<title>Q&amp;A &lt;draft&gt;</title>"));
        assert!(html.contains("<em>x</em>"));
    }

    #[test]
    fn test_site_settings() {
        let site = SiteConfig {
            lang: "zh-CN".into(),
            stylesheet: "/hidria/assets/style.css".into(),
            ..SiteConfig::default()
        };
        let html = PageTemplate::new(&site).unwrap().assemble("t", "").unwrap();

        assert!(html.contains("<html lang=\"zh-CN\">"));
        assert!(html.contains("href=\"/hidria/assets/style.css\""));
    }

    #[test]
    fn test_custom_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<h1>{{ title }}</h1>{{ content | safe }}").unwrap();

        let site = SiteConfig {
            template: Some(path),
            ..SiteConfig::default()
        };
        let template = PageTemplate::new(&site).unwrap();
        assert_eq!(template.assemble("A", "<p>b</p>").unwrap(), "<h1>A</h1><p>b</p>");

        let out = dir.path().join("nested/dir/a.html");
        template.assemble_to_file("A", "", &out).unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), "<h1>A</h1>");
    }

    #[test]
    fn test_bad_template_is_reported() {
        let result = PageTemplate::from_source("{{ unclosed", &SiteConfig::default());
        assert!(matches!(result, Err(TemplateError::Tera(_))));
    }
}
