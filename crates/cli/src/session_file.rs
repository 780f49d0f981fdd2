use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use framecast_core::session::session_state::SessionState;

use crate::config::app_data_dir;

#[derive(Error, Debug)]
pub enum SessionFileError {
    #[error("cannot access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt session file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file carrying the session between CLI invocations.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        app_data_dir().join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the session; a missing file is a fresh session.
    pub fn load(&self) -> Result<SessionState, SessionFileError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json).map_err(|source| SessionFileError::Parse {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SessionState::new()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    pub fn save(&self, session: &SessionState) -> Result<(), SessionFileError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(session).map_err(|source| {
            SessionFileError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    /// Forgets the session file.
    pub fn reset(&self) -> Result<(), SessionFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SessionFileError {
        SessionFileError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecast_core::export::domain::exporter::FolderId;
    use framecast_core::session::session_state::{ResultLocation, Screen, ScreenState};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_new_session() {
        let dir = tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));
        assert_eq!(file.load().unwrap(), SessionState::new());
    }

    #[test]
    fn test_save_load_reset() {
        let dir = tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("data").join("session.json"));

        let mut session = SessionState::new();
        session.mark_processed(
            Screen::Decompose,
            ResultLocation {
                container: "extracted-frames".to_string(),
                blob: None,
            },
        );
        session
            .mark_exported(Screen::Decompose, Some(FolderId("Extracted Frames".into())))
            .unwrap();
        file.save(&session).unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded, session);
        assert!(matches!(loaded.decompose, ScreenState::Exported { .. }));
        assert_eq!(loaded.recompose, ScreenState::Idle);

        file.reset().unwrap();
        assert!(!file.path().exists());
        assert_eq!(file.load().unwrap(), SessionState::new());
        file.reset().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"decompose": {"state": "bogus"}}"#).unwrap();
        assert!(matches!(
            SessionFile::new(path).load(),
            Err(SessionFileError::Parse { .. })
        ));
    }
}
