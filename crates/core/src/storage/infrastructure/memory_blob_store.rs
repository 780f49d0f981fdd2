use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::storage::domain::blob_store::{validate_name, BlobStore, StoreError};

type Containers = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// Process-local blob store. Clones share the same contents, so a test can
/// keep a handle while a use case owns another.
///
/// Lists blobs in lexical name order.
#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    containers: Arc<Mutex<Containers>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every container currently held, in name order.
    #[cfg(test)]
    pub(crate) fn container_names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Containers> {
        self.containers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BlobStore for InMemoryBlobStore {
    fn container_exists(&self, container: &str) -> Result<bool, StoreError> {
        validate_name(container)?;
        Ok(self.lock().contains_key(container))
    }

    fn create_container(&mut self, container: &str) -> Result<(), StoreError> {
        validate_name(container)?;
        self.lock().entry(container.to_string()).or_default();
        Ok(())
    }

    fn list_blobs(&self, container: &str) -> Result<Vec<String>, StoreError> {
        validate_name(container)?;
        self.lock()
            .get(container)
            .map(|blobs| blobs.keys().cloned().collect())
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))
    }

    fn read_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        validate_name(container)?;
        validate_name(name)?;
        let containers = self.lock();
        let blobs = containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        blobs
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            })
    }

    fn write_blob(
        &mut self,
        container: &str,
        name: &str,
        bytes: &[u8],
        overwrite: bool,
    ) -> Result<(), StoreError> {
        validate_name(container)?;
        validate_name(name)?;
        let mut containers = self.lock();
        let blobs = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        if !overwrite && blobs.contains_key(name) {
            return Err(StoreError::BlobExists {
                container: container.to_string(),
                name: name.to_string(),
            });
        }
        blobs.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete_blob(&mut self, container: &str, name: &str) -> Result<(), StoreError> {
        validate_name(container)?;
        validate_name(name)?;
        let mut containers = self.lock();
        let blobs = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        blobs
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            })
    }

    fn delete_container(&mut self, container: &str) -> Result<(), StoreError> {
        validate_name(container)?;
        self.lock().remove(container);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_container(name: &str) -> InMemoryBlobStore {
        let mut store = InMemoryBlobStore::new();
        store.create_container(name).unwrap();
        store
    }

    #[test]
    fn test_write_then_read() {
        let mut store = store_with_container("c");
        store.write_blob("c", "frame0.png", b"png", false).unwrap();
        assert_eq!(store.read_blob("c", "frame0.png").unwrap(), b"png");
    }

    #[test]
    fn test_write_without_overwrite_keeps_original() {
        let mut store = store_with_container("c");
        store.write_blob("c", "a.png", b"first", false).unwrap();
        let result = store.write_blob("c", "a.png", b"second", false);
        assert!(matches!(result, Err(StoreError::BlobExists { .. })));
        assert_eq!(store.read_blob("c", "a.png").unwrap(), b"first");
    }

    #[test]
    fn test_write_with_overwrite_replaces() {
        let mut store = store_with_container("c");
        store.write_blob("c", "a.png", b"first", false).unwrap();
        store.write_blob("c", "a.png", b"second", true).unwrap();
        assert_eq!(store.read_blob("c", "a.png").unwrap(), b"second");
    }

    #[test]
    fn test_list_is_lexical() {
        let mut store = store_with_container("c");
        for name in ["frame2.png", "frame10.png", "frame1.png"] {
            store.write_blob("c", name, b"", false).unwrap();
        }
        assert_eq!(
            store.list_blobs("c").unwrap(),
            vec!["frame1.png", "frame10.png", "frame2.png"]
        );
    }

    #[test]
    fn test_missing_container_and_blob() {
        let mut store = store_with_container("c");
        assert!(matches!(
            store.list_blobs("nope"),
            Err(StoreError::ContainerNotFound(_))
        ));
        assert!(matches!(
            store.write_blob("nope", "a", b"", true),
            Err(StoreError::ContainerNotFound(_))
        ));
        assert!(matches!(
            store.read_blob("c", "missing.png"),
            Err(StoreError::BlobNotFound { .. })
        ));
        assert!(matches!(
            store.delete_blob("c", "missing.png"),
            Err(StoreError::BlobNotFound { .. })
        ));
    }

    #[test]
    fn test_clones_share_contents() {
        let mut store = store_with_container("c");
        let observer = store.clone();
        store.write_blob("c", "a.png", b"x", false).unwrap();
        assert_eq!(observer.list_blobs("c").unwrap(), vec!["a.png"]);
    }

    #[test]
    fn test_delete_removes_blob() {
        let mut store = store_with_container("c");
        store.write_blob("c", "a.png", b"x", false).unwrap();
        store.delete_blob("c", "a.png").unwrap();
        assert!(store.list_blobs("c").unwrap().is_empty());
    }

    #[test]
    fn test_delete_container_drops_blobs() {
        let mut store = store_with_container("c");
        store.write_blob("c", "a.png", b"x", false).unwrap();
        store.delete_container("c").unwrap();
        assert!(!store.container_exists("c").unwrap());
        store.delete_container("c").unwrap();
    }
}
