use super::blob_store::{BlobStore, StoreError};

/// Readies `container` as scratch space for a new request: creates it when
/// missing, otherwise deletes every blob it holds. Returns how many blobs
/// were removed.
pub fn prepare_working_container(
    store: &mut dyn BlobStore,
    container: &str,
) -> Result<usize, StoreError> {
    if !store.container_exists(container)? {
        store.create_container(container)?;
        return Ok(0);
    }

    let names = store.list_blobs(container)?;
    for name in &names {
        store.delete_blob(container, name)?;
    }
    Ok(names.len())
}

/// Picks the container name for one request.
///
/// Isolated requests get `<base>-<uuid>` so concurrent sessions never clear
/// each other's frames; otherwise the shared `base` name is used.
pub fn allocate_container_name(base: &str, isolate: bool) -> String {
    if isolate {
        format!("{base}-{}", uuid::Uuid::new_v4().simple())
    } else {
        base.to_string()
    }
}
