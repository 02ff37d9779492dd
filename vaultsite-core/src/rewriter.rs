//! Second pass over a built site: make relative `href`/`src` values absolute
//! under the site's base path, so pages work when the site is served from a
//! sub-path (e.g. GitHub Pages project sites).
//!
//! Attributes are matched with a regex over the raw HTML. Only double-quoted,
//! non-empty values are seen; anything else is left as it is.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;
use walkdir::WalkDir;

static LINK_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(href|src)="([^"]+)""#).expect("valid attribute regex"));

/// Values starting with one of these are never touched.
const SKIP_PREFIXES: &[&str] = &["http://", "https://", "mailto:", "#", "javascript:", "/", "?"];

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteReport {
    pub files_scanned: usize,
    pub files_rewritten: usize,
}

#[derive(Debug, Clone)]
pub struct LinkRewriter {
    base_path: String,
}

impl LinkRewriter {
    /// `base_path` gets a trailing `/` if it lacks one.
    pub fn new(base_path: &str) -> Self {
        let mut base_path = base_path.to_string();
        if !base_path.ends_with('/') {
            base_path.push('/');
        }

        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// The rewritten form of one attribute value, or `None` to keep it.
    pub fn rewrite_url(&self, url: &str) -> Option<String> {
        if SKIP_PREFIXES.iter().any(|p| url.starts_with(*p)) {
            return None;
        }

        let url = url.strip_prefix("./").unwrap_or(url);
        Some(format!("{}{}", self.base_path, url))
    }

    pub fn rewrite_html<'a>(&self, html: &'a str) -> Cow<'a, str> {
        let mut changed = false;
        let out = LINK_ATTR.replace_all(html, |caps: &Captures| match self.rewrite_url(&caps[2]) {
            Some(url) => {
                changed = true;
                format!("{}=\"{}\"", &caps[1], url)
            }
            None => caps[0].to_string(),
        });

        if changed { out } else { Cow::Borrowed(html) }
    }

    /// Rewrite every `.html` file below `output_dir` in place.
    ///
    /// Files without a rewritable link are not written.
    pub fn rewrite_dir<P: AsRef<Path>>(&self, output_dir: P) -> Result<RewriteReport, RewriteError> {
        let mut report = RewriteReport::default();

        for entry in WalkDir::new(output_dir.as_ref()).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            let is_html = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
            if !entry.file_type().is_file() || !is_html {
                continue;
            }

            report.files_scanned += 1;
            let html = std::fs::read_to_string(path)?;
            if let Cow::Owned(rewritten) = self.rewrite_html(&html) {
                tracing::debug!("Rewriting links in {}", path.display());
                std::fs::write(path, rewritten)?;
                report.files_rewritten += 1;
            }
        }

        tracing::info!(
            scanned = report.files_scanned,
            rewritten = report.files_rewritten,
            "Rewrote links under {}",
            self.base_path
        );

        Ok(report)
    }
}
