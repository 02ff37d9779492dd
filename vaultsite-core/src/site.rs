use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Markdown,
    Asset,
}

/// A file discovered in the vault that ends up in the output tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Absolute or caller-relative path used for reading.
    pub path: PathBuf,
    /// Path below the vault root, reused below the output root.
    pub relative_path: PathBuf,
    pub kind: FileKind,
}

impl SourceFile {
    pub fn out_path(&self) -> PathBuf {
        match self.kind {
            FileKind::Markdown => self.relative_path.with_extension("html"),
            FileKind::Asset => self.relative_path.clone(),
        }
    }

    /// File name without extension, used when a page has no title heading.
    pub fn stem(&self) -> String {
        self.relative_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// A rendered Markdown page.
#[derive(Debug)]
pub struct Page {
    pub title: String,
    pub path: PathBuf,
    pub body_html: String,
}

impl Page {
    pub fn url(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }

    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.path)
    }
}
