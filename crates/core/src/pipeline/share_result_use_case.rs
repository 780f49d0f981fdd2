use crate::export::domain::exporter::{Exporter, FolderId};
use crate::session::session_state::{ResultLocation, Screen, SessionState};
use crate::shared::constants::{STILL_MIME_TYPE, VIDEO_MIME_TYPE};
use crate::storage::domain::blob_store::BlobStore;
use crate::video::domain::frame_order::sort_by_frame_number;

use super::conversion_settings::ConversionSettings;
use super::pipeline_error::PipelineError;
use super::pipeline_logger::PipelineLogger;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareReport {
    /// Folder created for the upload; `None` when files went to the root.
    pub folder: Option<FolderId>,
    pub files_uploaded: usize,
}

/// Pushes a screen's stored result to the export target.
///
/// Decompose results go into a fresh folder, one file per still in frame
/// order. The Recompose video is uploaded on its own with no parent folder.
/// The session only moves to `Exported` once every upload succeeded.
pub struct ShareResultUseCase {
    store: Box<dyn BlobStore>,
    exporter: Box<dyn Exporter>,
    settings: ConversionSettings,
}

impl ShareResultUseCase {
    pub fn new(
        store: Box<dyn BlobStore>,
        exporter: Box<dyn Exporter>,
        settings: ConversionSettings,
    ) -> Self {
        Self {
            store,
            exporter,
            settings,
        }
    }

    pub fn execute(
        &mut self,
        session: &mut SessionState,
        screen: Screen,
        logger: &mut dyn PipelineLogger,
    ) -> Result<ShareReport, PipelineError> {
        let location = session.ready(screen)?.clone();

        let report = match screen {
            Screen::Decompose => self.share_stills(&location, logger)?,
            Screen::Recompose => self.share_video(&location, logger)?,
        };

        session.mark_exported(screen, report.folder.clone())?;
        Ok(report)
    }

    fn share_stills(
        &mut self,
        location: &ResultLocation,
        logger: &mut dyn PipelineLogger,
    ) -> Result<ShareReport, PipelineError> {
        let mut names = self.store.list_blobs(&location.container)?;
        sort_by_frame_number(&mut names);

        let folder = self
            .exporter
            .create_folder(&self.settings.export_folder_title)?;
        logger.info(&format!(
            "Sharing {} stills into '{}'",
            names.len(),
            self.settings.export_folder_title
        ));

        for (i, name) in names.iter().enumerate() {
            let bytes = self.store.read_blob(&location.container, name)?;
            self.exporter
                .upload_file(Some(&folder), name, STILL_MIME_TYPE, &bytes)?;
            logger.progress(i + 1, names.len());
        }

        Ok(ShareReport {
            folder: Some(folder),
            files_uploaded: names.len(),
        })
    }

    fn share_video(
        &mut self,
        location: &ResultLocation,
        logger: &mut dyn PipelineLogger,
    ) -> Result<ShareReport, PipelineError> {
        let name = location
            .blob
            .as_deref()
            .unwrap_or(&self.settings.output_video_name);
        let bytes = self.store.read_blob(&location.container, name)?;

        self.exporter
            .upload_file(None, name, VIDEO_MIME_TYPE, &bytes)?;
        logger.info(&format!("Shared {name} ({} bytes)", bytes.len()));

        Ok(ShareReport {
            folder: None,
            files_uploaded: 1,
        })
    }
}
