use crate::export::infrastructure::zip_archive::build_zip;
use crate::session::session_state::{Screen, SessionState};
use crate::shared::constants::{ARCHIVE_MIME_TYPE, VIDEO_MIME_TYPE};
use crate::storage::domain::blob_store::BlobStore;
use crate::video::domain::frame_order::sort_by_frame_number;

use super::conversion_settings::ConversionSettings;
use super::pipeline_error::PipelineError;

/// A file ready to hand to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Packages a screen's stored result for download: a ZIP of every still
/// for Decompose, the assembled video for Recompose. Leaves the session
/// untouched.
pub struct DownloadResultUseCase {
    store: Box<dyn BlobStore>,
    settings: ConversionSettings,
}

impl DownloadResultUseCase {
    pub fn new(store: Box<dyn BlobStore>, settings: ConversionSettings) -> Self {
        Self { store, settings }
    }

    pub fn execute(&self, session: &SessionState, screen: Screen) -> Result<Download, PipelineError> {
        let location = session.ready(screen)?;

        match screen {
            Screen::Decompose => {
                let mut names = self.store.list_blobs(&location.container)?;
                sort_by_frame_number(&mut names);

                let mut stills = Vec::with_capacity(names.len());
                for name in names {
                    let bytes = self.store.read_blob(&location.container, &name)?;
                    stills.push((name, bytes));
                }
                let archive = build_zip(
                    stills
                        .iter()
                        .map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
                )?;
                log::debug!("Packed {} stills into {} bytes", stills.len(), archive.len());

                Ok(Download {
                    file_name: self.settings.frames_archive_name.clone(),
                    mime_type: ARCHIVE_MIME_TYPE,
                    bytes: archive,
                })
            }
            Screen::Recompose => {
                let name = location
                    .blob
                    .clone()
                    .unwrap_or_else(|| self.settings.output_video_name.clone());
                let bytes = self.store.read_blob(&location.container, &name)?;

                Ok(Download {
                    file_name: name,
                    mime_type: VIDEO_MIME_TYPE,
                    bytes,
                })
            }
        }
    }
}
