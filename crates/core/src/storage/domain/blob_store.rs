use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),
    #[error("blob not found: {container}/{name}")]
    BlobNotFound { container: String, name: String },
    #[error("blob already exists: {container}/{name}")]
    BlobExists { container: String, name: String },
    #[error("invalid container or blob name: {0:?}")]
    InvalidName(String),
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Named-container key/value byte store.
///
/// Listing order is implementation-defined. Callers that need playback
/// order sort names themselves (see `frame_order`).
pub trait BlobStore: Send {
    fn container_exists(&self, container: &str) -> Result<bool, StoreError>;

    /// Creates an empty container. Creating one that exists is a no-op.
    fn create_container(&mut self, container: &str) -> Result<(), StoreError>;

    fn list_blobs(&self, container: &str) -> Result<Vec<String>, StoreError>;

    fn read_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Stores `bytes` under `name`. With `overwrite == false` an existing
    /// blob is left untouched and `BlobExists` is returned.
    fn write_blob(
        &mut self,
        container: &str,
        name: &str,
        bytes: &[u8],
        overwrite: bool,
    ) -> Result<(), StoreError>;

    fn delete_blob(&mut self, container: &str, name: &str) -> Result<(), StoreError>;

    /// Removes a container with every blob in it. A missing container is
    /// not an error.
    fn delete_container(&mut self, container: &str) -> Result<(), StoreError>;
}

/// Rejects names that could escape a container or collide with its root.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        Err(StoreError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
