use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parsing(#[from] toml::de::Error),
}

/// Everything the site walker and the link rewriter need to know about a vault.
///
/// Every section is optional in the TOML file; missing keys fall back to the
/// defaults below.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub vault: VaultConfig,
    pub markdown: MarkdownConfig,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Value of the `lang` attribute on `<html>`.
    pub lang: String,
    /// Stylesheet linked from every page.
    pub stylesheet: String,
    /// Prefix for rewritten relative links. A missing trailing `/` is added.
    pub base_path: String,
    /// Optional tera template replacing the built-in page shell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            lang: "en".into(),
            stylesheet: "/assets/style.css".into(),
            base_path: "/".into(),
            template: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VaultConfig {
    /// Directory copied wholesale into the output root.
    pub assets_dir: String,
    /// Directory names pruned from every traversal.
    pub exclude_dirs: Vec<String>,
    /// Extensions (without the dot, case-insensitive) copied verbatim.
    pub static_extensions: Vec<String>,
    /// Extensions (without the dot, case-insensitive) rendered to HTML.
    pub markdown_extensions: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            assets_dir: "assets".into(),
            exclude_dirs: to_strings(&[".obsidian", "_site", ".github", "tools"]),
            static_extensions: to_strings(&[
                "png", "jpg", "jpeg", "webp", "gif", "svg", "pdf", "css", "js", "json", "yml",
                "yaml", "woff", "woff2", "ttf", "otf", "mp3", "ogg", "canvas",
            ]),
            markdown_extensions: to_strings(&["md"]),
        }
    }
}

impl VaultConfig {
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    pub fn is_static(&self, path: &Path) -> bool {
        has_extension(path, &self.static_extensions)
    }

    pub fn is_markdown(&self, path: &Path) -> bool {
        has_extension(path, &self.markdown_extensions)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub footnotes: bool,
    /// Name of a syntect default theme. Highlighting is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax_theme: Option<String>,
    /// Turn the stray `</br>` spellings into `<br>`.
    pub normalize_breaks: bool,
    /// Turn `==text==` into `<mark>text</mark>`.
    pub highlight_marks: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: false,
            tasklists: false,
            footnotes: false,
            syntax_theme: None,
            normalize_breaks: true,
            highlight_marks: true,
        }
    }
}

fn has_extension(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
