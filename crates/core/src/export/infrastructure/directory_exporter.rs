use std::fs;
use std::path::{Path, PathBuf};

use crate::export::domain::exporter::{ExportError, Exporter, FolderId};

/// Exports into a local directory. Folders become sub-directories; a title
/// that is already taken gets a ` (n)` suffix, as drive UIs do.
pub struct DirectoryExporter {
    root: PathBuf,
}

impl DirectoryExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn ensure_root(&self) -> Result<(), ExportError> {
        fs::create_dir_all(&self.root).map_err(|source| ExportError::Io {
            path: self.root.clone(),
            source,
        })
    }
}

fn check_title(title: &str) -> Result<(), ExportError> {
    let invalid = title.trim().is_empty()
        || title == "."
        || title == ".."
        || title.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if invalid {
        Err(ExportError::InvalidTitle(title.to_string()))
    } else {
        Ok(())
    }
}

fn first_free_path(root: &Path, title: &str) -> PathBuf {
    let candidate = root.join(title);
    if !candidate.exists() {
        return candidate;
    }
    (1..)
        .map(|n| root.join(format!("{title} ({n})")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

impl Exporter for DirectoryExporter {
    fn create_folder(&mut self, title: &str) -> Result<FolderId, ExportError> {
        check_title(title)?;
        self.ensure_root()?;

        let path = first_free_path(&self.root, title);
        fs::create_dir(&path).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(title)
            .to_string();
        log::debug!("Created export folder {}", path.display());
        Ok(FolderId(name))
    }

    fn upload_file(
        &mut self,
        parent: Option<&FolderId>,
        title: &str,
        _mime_type: &str,
        bytes: &[u8],
    ) -> Result<(), ExportError> {
        check_title(title)?;
        self.ensure_root()?;

        let dir = match parent {
            Some(folder) => {
                check_title(&folder.0)?;
                self.root.join(&folder.0)
            }
            None => self.root.clone(),
        };
        let path = dir.join(title);
        fs::write(&path, bytes).map_err(|source| ExportError::Io { path, source })
    }
}
