use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::storage::domain::blob_store::{validate_name, BlobStore, StoreError};

/// Blob store on the local filesystem: one directory per container under
/// `root`, one file per blob.
///
/// Lists blobs in lexical name order.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &str) -> Result<PathBuf, StoreError> {
        validate_name(container)?;
        Ok(self.root.join(container))
    }

    fn existing_container_dir(&self, container: &str) -> Result<PathBuf, StoreError> {
        let dir = self.container_dir(container)?;
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StoreError::ContainerNotFound(container.to_string()))
        }
    }

    fn blob_path(&self, container: &str, name: &str) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        Ok(self.existing_container_dir(container)?.join(name))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl BlobStore for LocalBlobStore {
    fn container_exists(&self, container: &str) -> Result<bool, StoreError> {
        Ok(self.container_dir(container)?.is_dir())
    }

    fn create_container(&mut self, container: &str) -> Result<(), StoreError> {
        let dir = self.container_dir(container)?;
        fs::create_dir_all(&dir).map_err(io_error(&dir))
    }

    fn list_blobs(&self, container: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.existing_container_dir(container)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_error(&dir))? {
            let entry = entry.map_err(io_error(&dir))?;
            if !entry.file_type().map_err(io_error(&dir))?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            } else {
                log::warn!("Skipping non UTF-8 blob name in {}", dir.display());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.blob_path(container, name)?;
        fs::read(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => StoreError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            },
            _ => StoreError::Io { path, source },
        })
    }

    fn write_blob(
        &mut self,
        container: &str,
        name: &str,
        bytes: &[u8],
        overwrite: bool,
    ) -> Result<(), StoreError> {
        let path = self.blob_path(container, name)?;

        let mut options = fs::OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(&path).map_err(|source| match source.kind() {
            ErrorKind::AlreadyExists => StoreError::BlobExists {
                container: container.to_string(),
                name: name.to_string(),
            },
            _ => StoreError::Io {
                path: path.clone(),
                source,
            },
        })?;
        file.write_all(bytes).map_err(io_error(&path))
    }

    fn delete_blob(&mut self, container: &str, name: &str) -> Result<(), StoreError> {
        let path = self.blob_path(container, name)?;
        fs::remove_file(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => StoreError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            },
            _ => StoreError::Io { path, source },
        })
    }

    fn delete_container(&mut self, container: &str) -> Result<(), StoreError> {
        let dir = self.container_dir(container)?;
        match fs::remove_dir_all(&dir) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(StoreError::Io {
                path: dir,
                source: e,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, LocalBlobStore) {
        let tmp = TempDir::new().unwrap();
        let store = LocalBlobStore::open(tmp.path().join("blobs")).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_open_creates_root() {
        let (_tmp, store) = open_store();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_container_lifecycle() {
        let (_tmp, mut store) = open_store();
        assert!(!store.container_exists("extracted-frames").unwrap());
        store.create_container("extracted-frames").unwrap();
        store.create_container("extracted-frames").unwrap();
        assert!(store.container_exists("extracted-frames").unwrap());
        assert!(store.list_blobs("extracted-frames").unwrap().is_empty());
    }

    #[test]
    fn test_blobs_are_files_on_disk() {
        let (_tmp, mut store) = open_store();
        store.create_container("c").unwrap();
        store.write_blob("c", "frame0.png", b"png bytes", false).unwrap();

        let on_disk = store.root().join("c").join("frame0.png");
        assert_eq!(fs::read(on_disk).unwrap(), b"png bytes");
        assert_eq!(store.read_blob("c", "frame0.png").unwrap(), b"png bytes");
    }

    #[test]
    fn test_overwrite_semantics() {
        let (_tmp, mut store) = open_store();
        store.create_container("c").unwrap();
        store.write_blob("c", "a.png", b"long original", false).unwrap();

        assert!(matches!(
            store.write_blob("c", "a.png", b"x", false),
            Err(StoreError::BlobExists { .. })
        ));
        store.write_blob("c", "a.png", b"short", true).unwrap();
        assert_eq!(store.read_blob("c", "a.png").unwrap(), b"short");
    }

    #[test]
    fn test_list_is_sorted_and_ignores_directories() {
        let (_tmp, mut store) = open_store();
        store.create_container("c").unwrap();
        for name in ["frame2.png", "frame10.png", "frame1.png"] {
            store.write_blob("c", name, b"", false).unwrap();
        }
        fs::create_dir(store.root().join("c").join("nested")).unwrap();

        assert_eq!(
            store.list_blobs("c").unwrap(),
            vec!["frame1.png", "frame10.png", "frame2.png"]
        );
    }

    #[test]
    fn test_delete_and_missing_errors() {
        let (_tmp, mut store) = open_store();
        store.create_container("c").unwrap();
        store.write_blob("c", "a.png", b"x", false).unwrap();
        store.delete_blob("c", "a.png").unwrap();

        assert!(matches!(
            store.read_blob("c", "a.png"),
            Err(StoreError::BlobNotFound { .. })
        ));
        assert!(matches!(
            store.delete_blob("c", "a.png"),
            Err(StoreError::BlobNotFound { .. })
        ));
        assert!(matches!(
            store.list_blobs("missing"),
            Err(StoreError::ContainerNotFound(_))
        ));
    }

    #[test]
    fn test_delete_container_removes_directory() {
        let (_tmp, mut store) = open_store();
        store.create_container("c").unwrap();
        store.write_blob("c", "a.png", b"x", false).unwrap();

        store.delete_container("c").unwrap();
        assert!(!store.container_exists("c").unwrap());
        assert!(!store.root().join("c").exists());
        store.delete_container("c").unwrap();
    }

    #[test]
    fn test_path_traversal_rejected() {
        let (_tmp, mut store) = open_store();
        store.create_container("c").unwrap();
        assert!(matches!(
            store.write_blob("c", "../escape.png", b"x", true),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.create_container(".."),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.delete_container(".."),
            Err(StoreError::InvalidName(_))
        ));
    }
}
