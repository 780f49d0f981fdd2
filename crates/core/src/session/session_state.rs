use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::domain::exporter::FolderId;

/// The two independent pipelines as exposed to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Decompose,
    Recompose,
}

impl Screen {
    pub const ALL: &[Screen] = &[Screen::Decompose, Screen::Recompose];
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Decompose => write!(f, "Video to images"),
            Screen::Recompose => write!(f, "Images to video"),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0}: nothing to deliver yet, run the conversion first")]
    NotReady(Screen),
}

/// Where a screen's latest result lives in the blob store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLocation {
    pub container: String,
    /// Single-blob results (the assembled video); `None` means the whole
    /// container is the result.
    pub blob: Option<String>,
}

/// Lifecycle of one screen within a session.
///
/// `Idle` until a conversion completes, `Processed` once its result is
/// stored, `Exported` after the result was shared. A failed run goes back
/// to `Idle` only when it overwrote the stored result.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ScreenState {
    #[default]
    Idle,
    Processed {
        result: ResultLocation,
    },
    Exported {
        result: ResultLocation,
        folder: Option<FolderId>,
    },
}

impl ScreenState {
    /// A conversion finished and stored its result at `result`.
    pub fn processed(self, result: ResultLocation) -> Self {
        ScreenState::Processed { result }
    }

    /// The current result was shared. Fails from `Idle`.
    pub fn exported(self, screen: Screen, folder: Option<FolderId>) -> Result<Self, SessionError> {
        match self {
            ScreenState::Idle => Err(SessionError::NotReady(screen)),
            ScreenState::Processed { result } | ScreenState::Exported { result, .. } => {
                Ok(ScreenState::Exported { result, folder })
            }
        }
    }

    /// The stored result, if download and share are available.
    pub fn ready(&self, screen: Screen) -> Result<&ResultLocation, SessionError> {
        match self {
            ScreenState::Idle => Err(SessionError::NotReady(screen)),
            ScreenState::Processed { result } | ScreenState::Exported { result, .. } => Ok(result),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScreenState::Idle => "idle",
            ScreenState::Processed { .. } => "processed",
            ScreenState::Exported { .. } => "exported",
        }
    }
}

/// Per-session state of both screens. A new session starts with both idle.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub decompose: ScreenState,
    #[serde(default)]
    pub recompose: ScreenState,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self, screen: Screen) -> &ScreenState {
        match screen {
            Screen::Decompose => &self.decompose,
            Screen::Recompose => &self.recompose,
        }
    }

    fn screen_mut(&mut self, screen: Screen) -> &mut ScreenState {
        match screen {
            Screen::Decompose => &mut self.decompose,
            Screen::Recompose => &mut self.recompose,
        }
    }

    /// Records a completed run and returns the result it replaced.
    pub fn mark_processed(
        &mut self,
        screen: Screen,
        result: ResultLocation,
    ) -> Option<ResultLocation> {
        let state = self.screen_mut(screen);
        let replaced = state.ready(screen).ok().cloned();
        *state = std::mem::take(state).processed(result);
        replaced
    }

    /// Sends every screen whose result lives in `container` back to `Idle`
    /// and returns those screens.
    pub fn invalidate_container(&mut self, container: &str) -> Vec<Screen> {
        let mut invalidated = Vec::new();
        for &screen in Screen::ALL {
            let state = self.screen_mut(screen);
            if state.ready(screen).is_ok_and(|r| r.container == container) {
                *state = ScreenState::Idle;
                invalidated.push(screen);
            }
        }
        invalidated
    }

    pub fn mark_exported(
        &mut self,
        screen: Screen,
        folder: Option<FolderId>,
    ) -> Result<(), SessionError> {
        let state = self.screen_mut(screen);
        let next = state.clone().exported(screen, folder)?;
        *state = next;
        Ok(())
    }

    pub fn ready(&self, screen: Screen) -> Result<&ResultLocation, SessionError> {
        self.screen(screen).ready(screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames_location() -> ResultLocation {
        ResultLocation {
            container: "extracted-frames".to_string(),
            blob: None,
        }
    }

    fn video_location() -> ResultLocation {
        ResultLocation {
            container: "video-container".to_string(),
            blob: Some("converted-video.mp4".to_string()),
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = SessionState::new();
        for &screen in Screen::ALL {
            assert_eq!(session.screen(screen), &ScreenState::Idle);
            assert!(session.ready(screen).is_err());
        }
    }

    #[test]
    fn test_idle_cannot_deliver() {
        let mut session = SessionState::new();
        assert_eq!(
            session.ready(Screen::Decompose),
            Err(SessionError::NotReady(Screen::Decompose))
        );
        assert_eq!(
            session.mark_exported(Screen::Recompose, None),
            Err(SessionError::NotReady(Screen::Recompose))
        );
        assert_eq!(session.recompose, ScreenState::Idle);
    }

    #[test]
    fn test_process_then_export() {
        let mut session = SessionState::new();
        session.mark_processed(Screen::Decompose, frames_location());
        assert_eq!(session.ready(Screen::Decompose).unwrap(), &frames_location());
        assert_eq!(session.decompose.label(), "processed");

        let folder = FolderId("abc".to_string());
        session
            .mark_exported(Screen::Decompose, Some(folder.clone()))
            .unwrap();
        assert_eq!(
            session.decompose,
            ScreenState::Exported {
                result: frames_location(),
                folder: Some(folder),
            }
        );
        assert!(session.ready(Screen::Decompose).is_ok());
    }

    #[test]
    fn test_exported_can_export_again_and_reprocess() {
        let mut session = SessionState::new();
        session.mark_processed(Screen::Recompose, video_location());
        session.mark_exported(Screen::Recompose, None).unwrap();
        session.mark_exported(Screen::Recompose, None).unwrap();
        assert_eq!(session.recompose.label(), "exported");

        let replaced = session.mark_processed(Screen::Recompose, video_location());
        assert_eq!(replaced, Some(video_location()));
        assert_eq!(session.recompose.label(), "processed");
    }

    #[test]
    fn test_first_result_replaces_nothing() {
        let mut session = SessionState::new();
        assert_eq!(
            session.mark_processed(Screen::Decompose, frames_location()),
            None
        );
    }

    #[test]
    fn test_invalidate_container_resets_only_matching_screens() {
        let mut session = SessionState::new();
        session.mark_processed(Screen::Decompose, frames_location());
        session.mark_processed(Screen::Recompose, video_location());
        session.mark_exported(Screen::Decompose, None).unwrap();

        assert_eq!(
            session.invalidate_container("extracted-frames"),
            vec![Screen::Decompose]
        );
        assert_eq!(session.decompose, ScreenState::Idle);
        assert_eq!(session.recompose.label(), "processed");
        assert!(session.invalidate_container("temporary-frames").is_empty());
    }

    #[test]
    fn test_screens_are_independent() {
        let mut session = SessionState::new();
        session.mark_processed(Screen::Recompose, video_location());
        assert!(session.ready(Screen::Recompose).is_ok());
        assert!(session.ready(Screen::Decompose).is_err());
    }

    #[test]
    fn test_error_message_names_screen() {
        let err = SessionError::NotReady(Screen::Recompose);
        assert_eq!(
            err.to_string(),
            "Images to video: nothing to deliver yet, run the conversion first"
        );
    }
}
