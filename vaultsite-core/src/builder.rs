use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::callout::translate_callouts;
use crate::config::{Config, MarkdownConfig, SiteConfig, VaultConfig};
use crate::markdown::{cleanup, extract_title};
use crate::renderer::MarkdownRenderer;
use crate::scanner::{ScanError, SiteScanner};
use crate::site::{FileKind, Page, SourceFile};
use crate::template::{PageTemplate, TemplateError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Source directory not specified")]
    MissingSourceDir,
    #[error(
        "Output directory {} would replace the source directory {}",
        output.display(),
        source_dir.display()
    )]
    OutputOverlapsSource {
        source_dir: PathBuf,
        output: PathBuf,
    },
    #[error("Scan error: {0}")]
    ScanError(#[from] ScanError),
    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),
}

/// What a build produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub assets_copied: usize,
    pub pages_written: usize,
}

pub struct SiteBuilder {
    source_dir: Option<PathBuf>,
    output_dir: PathBuf,
    config: Config,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            source_dir: None,
            output_dir: PathBuf::from("./_site"),
            config: Config::default(),
        }
    }

    // Required configuration
    pub fn source_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_dir = Some(path.as_ref().to_path_buf());
        self
    }

    // Optional paths
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn site_config(mut self, config: SiteConfig) -> Self {
        self.config.site = config;
        self
    }

    pub fn vault_config(mut self, config: VaultConfig) -> Self {
        self.config.vault = config;
        self
    }

    pub fn markdown_config(mut self, config: MarkdownConfig) -> Self {
        self.config.markdown = config;
        self
    }

    pub fn build(self) -> Result<Site, BuildError> {
        let source_dir = self.source_dir.ok_or(BuildError::MissingSourceDir)?;
        let source_dir = source_dir.canonicalize()?;
        let output_dir = resolve_path(&self.output_dir)?;

        // Wiping the output must never take the vault with it.
        if source_dir.starts_with(&output_dir) {
            return Err(BuildError::OutputOverlapsSource {
                source_dir,
                output: output_dir,
            });
        }

        let renderer = MarkdownRenderer::new(&self.config.markdown);
        let template = PageTemplate::new(&self.config.site)?;

        Ok(Site {
            source_dir,
            output_dir,
            config: self.config,
            renderer,
            template,
        })
    }
}

pub struct Site {
    source_dir: PathBuf,
    output_dir: PathBuf,
    config: Config,
    renderer: MarkdownRenderer,
    template: PageTemplate,
}

impl Site {
    /// Build the whole site.
    ///
    /// The output directory is deleted first and cannot be recovered. Any I/O
    /// error aborts the build and leaves a partial output tree behind.
    pub fn render_all(&self) -> Result<BuildReport, BuildError> {
        self.reset_output_dir()?;

        let scanner = SiteScanner::new(&self.source_dir, self.config.vault.clone())
            .skip_dir(&self.output_dir);

        // Assets go first, pages may reference them.
        let mut report = BuildReport {
            assets_copied: self.copy_assets_dir()?,
            ..BuildReport::default()
        };

        for file in scanner.scan()? {
            match file.kind {
                FileKind::Asset => {
                    copy_file(&file.path, &self.output_dir.join(file.out_path()))?;
                    report.assets_copied += 1;
                }
                FileKind::Markdown => {
                    let page = self.render_page(&file)?;
                    let output_path = page.output_path(&self.output_dir);
                    tracing::debug!("Writing {} ({})", page.url(), page.title);

                    self.template
                        .assemble_to_file(&page.title, &page.body_html, &output_path)?;
                    report.pages_written += 1;
                }
            }
        }

        tracing::info!(
            assets = report.assets_copied,
            pages = report.pages_written,
            "Built {}",
            self.output_dir.display()
        );

        Ok(report)
    }

    /// Read and render one Markdown file.
    pub fn render_page(&self, file: &SourceFile) -> Result<Page, BuildError> {
        let content = fs::read_to_string(&file.path)?;
        let (title, body_html) = self.render_markdown(&content, &file.stem());

        Ok(Page {
            title,
            path: file.out_path(),
            body_html,
        })
    }

    /// Title and body fragment for a Markdown document.
    ///
    /// The title is taken from the text as written, before any rewriting.
    pub fn render_markdown(&self, content: &str, fallback_title: &str) -> (String, String) {
        let title = extract_title(content, fallback_title);

        let cleaned = cleanup(content, &self.config.markdown);
        let translated = translate_callouts(&cleaned, &self.renderer);
        let body_html = self.renderer.render(&translated);

        (title, body_html)
    }

    fn reset_output_dir(&self) -> Result<(), BuildError> {
        if self.output_dir.exists() {
            tracing::info!("Removing {}", self.output_dir.display());
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;

        Ok(())
    }

    /// Copy the assets directory wholesale, whatever the file types.
    fn copy_assets_dir(&self) -> Result<usize, BuildError> {
        let assets_dir = self.source_dir.join(&self.config.vault.assets_dir);
        if !assets_dir.is_dir() {
            return Ok(0);
        }

        let target_dir = self.output_dir.join(&self.config.vault.assets_dir);
        let mut copied = 0;
        for entry in WalkDir::new(&assets_dir).sort_by_file_name() {
            let entry = entry?;
            let Ok(relative) = entry.path().strip_prefix(&assets_dir) else {
                continue;
            };
            let target = target_dir.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else if entry.path().is_file() {
                copy_file(entry.path(), &target)?;
                copied += 1;
            }
        }

        Ok(copied)
    }
}

/// Build `source_dir` into `output_dir` in one go.
pub fn build_site(
    config: &Config,
    source_dir: &Path,
    output_dir: &Path,
) -> Result<BuildReport, BuildError> {
    SiteBuilder::new()
        .source_dir(source_dir)
        .output_dir(output_dir)
        .config(config.clone())
        .build()?
        .render_all()
}

/// Absolute form of `path` with `.`, `..` and symlinks resolved. Only the
/// leading part that exists is canonicalized, the rest is taken as written.
fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => {
                resolved.push(other);
                if resolved.exists() {
                    resolved = resolved.canonicalize()?;
                }
            }
        }
    }

    Ok(resolved)
}

/// Byte-for-byte copy keeping permissions and, where possible, the
/// modification time.
fn copy_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    tracing::debug!("Copying {} -> {}", from.display(), to.display());
    fs::copy(from, to)?;

    if let Err(e) = copy_modified_time(from, to) {
        tracing::debug!("Could not keep mtime of {}: {}", to.display(), e);
    }

    Ok(())
}

fn copy_modified_time(from: &Path, to: &Path) -> std::io::Result<()> {
    let modified = fs::metadata(from)?.modified()?;
    fs::File::options().write(true).open(to)?.set_modified(modified)
}
