use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::config::VaultConfig;
use crate::site::{FileKind, SourceFile};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}

/// Finds the files of a vault that belong in the output tree.
///
/// Excluded directory names are pruned at any depth, as are the directories
/// passed to [`SiteScanner::skip_dir`]. Results are sorted by path.
pub struct SiteScanner {
    source_dir: PathBuf,
    vault: VaultConfig,
    skip: Vec<PathBuf>,
}

impl SiteScanner {
    pub fn new<P: AsRef<Path>>(path: P, vault: VaultConfig) -> Self {
        Self {
            source_dir: path.as_ref().to_path_buf(),
            vault,
            skip: Vec::new(),
        }
    }

    /// Never descend into `path`, whatever its name.
    pub fn skip_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.skip.push(path.as_ref().to_path_buf());
        self
    }

    pub fn scan(&self) -> Result<Vec<SourceFile>, ScanError> {
        tracing::info!("Scanning: {}", self.source_dir.display());

        let mut files = self.scan_assets()?;
        files.extend(self.scan_pages()?);

        Ok(files)
    }

    /// Files with an allow-listed static extension.
    pub fn scan_assets(&self) -> Result<Vec<SourceFile>, ScanError> {
        self.walk(FileKind::Asset, |path| self.vault.is_static(path))
    }

    /// Markdown files.
    pub fn scan_pages(&self) -> Result<Vec<SourceFile>, ScanError> {
        self.walk(FileKind::Markdown, |path| self.vault.is_markdown(path))
    }

    fn walk(
        &self,
        kind: FileKind,
        accept: impl Fn(&Path) -> bool,
    ) -> Result<Vec<SourceFile>, ScanError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_pruned(e));

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !accept(path) {
                continue;
            }

            let relative_path = path
                .strip_prefix(&self.source_dir)
                .map_err(|_| ScanError::InvalidPath(path.to_path_buf()))?;

            files.push(SourceFile {
                path: path.to_path_buf(),
                relative_path: relative_path.to_path_buf(),
                kind,
            });
        }

        Ok(files)
    }

    fn is_pruned(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }

        let excluded_name = entry
            .file_name()
            .to_str()
            .is_some_and(|name| self.vault.is_excluded_dir(name));

        excluded_name || self.skip.iter().any(|s| s == entry.path())
    }
}
