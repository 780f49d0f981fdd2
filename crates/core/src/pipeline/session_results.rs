use crate::session::session_state::{ResultLocation, Screen, SessionState};
use crate::storage::domain::blob_store::BlobStore;

/// Records `result` as the screen's latest result. The replaced result's
/// container is deleted unless the new result lives in the same one.
pub fn commit_result(
    store: &mut dyn BlobStore,
    session: &mut SessionState,
    screen: Screen,
    result: ResultLocation,
) {
    let container = result.container.clone();
    if let Some(previous) = session.mark_processed(screen, result) {
        if previous.container != container {
            discard_container(store, &previous.container);
        }
    }
}

/// Cleans up after a run that failed once it had started writing into
/// `containers`.
///
/// A screen whose result lived in one of them no longer has a result.
/// Containers allocated for this run alone (`isolated`) are deleted.
pub fn abandon_run(
    store: &mut dyn BlobStore,
    session: &mut SessionState,
    containers: &[&str],
    isolated: bool,
) {
    for &container in containers {
        for screen in session.invalidate_container(container) {
            log::warn!("{screen}: stored result in '{container}' was overwritten by a failed run");
        }
        if isolated {
            discard_container(store, container);
        }
    }
}

/// Deletes every stored result of `session` and starts it over.
pub fn discard_results(store: &mut dyn BlobStore, session: &mut SessionState) {
    for &screen in Screen::ALL {
        if let Ok(result) = session.ready(screen) {
            discard_container(store, &result.container);
        }
    }
    *session = SessionState::new();
}

/// Deletes `container`. Failure only costs disk space, so it is logged.
pub fn discard_container(store: &mut dyn BlobStore, container: &str) {
    match store.delete_container(container) {
        Ok(()) => log::debug!("Deleted container '{container}'"),
        Err(e) => log::warn!("Could not delete container '{container}': {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::infrastructure::memory_blob_store::InMemoryBlobStore;

    fn store_with(containers: &[&str]) -> InMemoryBlobStore {
        let mut store = InMemoryBlobStore::new();
        for container in containers {
            store.create_container(container).unwrap();
            store.write_blob(container, "frame0.png", b"x", false).unwrap();
        }
        store
    }

    fn stills_in(container: &str) -> ResultLocation {
        ResultLocation {
            container: container.to_string(),
            blob: None,
        }
    }

    #[test]
    fn test_commit_deletes_replaced_container() {
        let mut store = store_with(&["extracted-frames-a", "extracted-frames-b"]);
        let mut session = SessionState::new();

        commit_result(&mut store, &mut session, Screen::Decompose, stills_in("extracted-frames-a"));
        commit_result(&mut store, &mut session, Screen::Decompose, stills_in("extracted-frames-b"));

        assert!(!store.container_exists("extracted-frames-a").unwrap());
        assert!(store.container_exists("extracted-frames-b").unwrap());
        assert_eq!(
            session.ready(Screen::Decompose).unwrap(),
            &stills_in("extracted-frames-b")
        );
    }

    #[test]
    fn test_commit_into_same_container_keeps_it() {
        let mut store = store_with(&["extracted-frames"]);
        let mut session = SessionState::new();

        commit_result(&mut store, &mut session, Screen::Decompose, stills_in("extracted-frames"));
        commit_result(&mut store, &mut session, Screen::Decompose, stills_in("extracted-frames"));

        assert_eq!(store.list_blobs("extracted-frames").unwrap(), vec!["frame0.png"]);
    }

    #[test]
    fn test_abandon_shared_run_forgets_overwritten_result() {
        let mut store = store_with(&["extracted-frames"]);
        let mut session = SessionState::new();
        session.mark_processed(Screen::Decompose, stills_in("extracted-frames"));

        abandon_run(&mut store, &mut session, &["extracted-frames"], false);

        assert!(session.ready(Screen::Decompose).is_err());
        assert!(store.container_exists("extracted-frames").unwrap());
    }

    #[test]
    fn test_abandon_isolated_run_deletes_its_containers() {
        let mut store = store_with(&["extracted-frames-old", "extracted-frames-new"]);
        let mut session = SessionState::new();
        session.mark_processed(Screen::Decompose, stills_in("extracted-frames-old"));

        abandon_run(&mut store, &mut session, &["extracted-frames-new"], true);

        assert!(!store.container_exists("extracted-frames-new").unwrap());
        assert!(store.container_exists("extracted-frames-old").unwrap());
        assert!(session.ready(Screen::Decompose).is_ok());
    }

    #[test]
    fn test_discard_results_empties_store_and_session() {
        let mut store = store_with(&["extracted-frames", "video-container", "unrelated"]);
        let mut session = SessionState::new();
        session.mark_processed(Screen::Decompose, stills_in("extracted-frames"));
        session.mark_processed(
            Screen::Recompose,
            ResultLocation {
                container: "video-container".to_string(),
                blob: Some("converted-video.mp4".to_string()),
            },
        );

        discard_results(&mut store, &mut session);

        assert_eq!(session, SessionState::new());
        assert!(!store.container_exists("extracted-frames").unwrap());
        assert!(!store.container_exists("video-container").unwrap());
        assert!(store.container_exists("unrelated").unwrap());
    }
}
