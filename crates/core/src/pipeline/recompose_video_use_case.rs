use crate::session::session_state::{ResultLocation, Screen, SessionState};
use crate::shared::frame::Frame;
use crate::shared::rates::FrameRate;
use crate::storage::domain::blob_store::BlobStore;
use crate::storage::domain::working_container::{
    allocate_container_name, prepare_working_container,
};
use crate::video::domain::frame_order::sort_by_frame_number;
use crate::video::domain::still_codec::StillCodec;
use crate::video::domain::video_writer::VideoWriter;

use super::conversion_settings::ConversionSettings;
use super::pipeline_error::PipelineError;
use super::pipeline_logger::PipelineLogger;
use super::session_results::{abandon_run, commit_result, discard_container};
use super::video_assembler::VideoAssembler;

/// Outcome of one Recompose run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecomposeReport {
    /// Where the assembled video was stored.
    pub location: ResultLocation,
    /// Working container the uploads were staged in. Deleted once the video
    /// is stored when requests are isolated.
    pub frames_container: String,
    pub frames_encoded: usize,
    pub video_bytes: usize,
}

/// Stills → video pipeline: clear container → store uploads → order by
/// frame number → decode → assemble → store the video → record in the
/// session.
pub struct RecomposeVideoUseCase {
    codec: Box<dyn StillCodec>,
    assembler: VideoAssembler,
    store: Box<dyn BlobStore>,
    settings: ConversionSettings,
}

impl RecomposeVideoUseCase {
    pub fn new(
        codec: Box<dyn StillCodec>,
        writer: Box<dyn VideoWriter>,
        store: Box<dyn BlobStore>,
        settings: ConversionSettings,
    ) -> Self {
        Self {
            codec,
            assembler: VideoAssembler::new(writer),
            store,
            settings,
        }
    }

    /// Assembles `uploads` (file name, image bytes) into a video at
    /// `frame_rate` and records it as the session's Recompose result.
    ///
    /// Playback order comes from the numeric part of each file name, not
    /// from upload or listing order. With isolated requests the uploads'
    /// container is deleted once the video is stored.
    pub fn execute<I>(
        &mut self,
        uploads: I,
        frame_rate: FrameRate,
        session: &mut SessionState,
        logger: &mut dyn PipelineLogger,
    ) -> Result<RecomposeReport, PipelineError>
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        let isolated = self.settings.isolate_requests;
        let frames_container =
            allocate_container_name(&self.settings.uploaded_frames_container, isolated);

        let (video, frames_encoded) =
            match self.assemble_uploads(&frames_container, uploads, frame_rate, logger) {
                Ok(assembled) => assembled,
                Err(e) => {
                    abandon_run(
                        &mut *self.store,
                        session,
                        &[frames_container.as_str()],
                        isolated,
                    );
                    return Err(e);
                }
            };

        let video_container = allocate_container_name(&self.settings.video_container, isolated);
        let video_name = self.settings.output_video_name.clone();
        if let Err(e) = self.store_video(&video_container, &video_name, &video) {
            abandon_run(
                &mut *self.store,
                session,
                &[frames_container.as_str(), video_container.as_str()],
                isolated,
            );
            return Err(e);
        }
        if isolated {
            discard_container(&mut *self.store, &frames_container);
        }

        logger.info(&format!(
            "Stored {video_name} ({} bytes) in '{video_container}'",
            video.len()
        ));
        logger.summary();

        let location = ResultLocation {
            container: video_container,
            blob: Some(video_name),
        };
        commit_result(
            &mut *self.store,
            session,
            Screen::Recompose,
            location.clone(),
        );

        Ok(RecomposeReport {
            location,
            frames_container,
            frames_encoded,
            video_bytes: video.len(),
        })
    }

    /// Stores the uploads in `frames_container`, then decodes them in frame
    /// order into the assembler. Returns the video and its frame count.
    fn assemble_uploads<I>(
        &mut self,
        frames_container: &str,
        uploads: I,
        frame_rate: FrameRate,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(Vec<u8>, usize), PipelineError>
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        prepare_working_container(&mut *self.store, frames_container)?;

        let mut uploaded = 0;
        for (name, bytes) in uploads {
            self.store
                .write_blob(frames_container, &name, &bytes, false)?;
            uploaded += 1;
        }
        log::debug!("Stored {uploaded} uploads in '{frames_container}'");

        let mut names = self.store.list_blobs(frames_container)?;
        sort_by_frame_number(&mut names);
        logger.info(&format!(
            "Recomposing {} images at {frame_rate} fps",
            names.len()
        ));

        let store: &dyn BlobStore = &*self.store;
        let codec: &dyn StillCodec = &*self.codec;
        let frames = names.iter().enumerate().map(|(position, name)| {
            let bytes = store.read_blob(frames_container, name)?;
            let frame = codec.decode(&bytes)?;
            log::debug!("Decoded {name} as frame {position}");
            Ok::<Frame, PipelineError>(frame.with_index(position))
        });

        let video = self.assembler.assemble(frames, frame_rate, logger)?;
        Ok((video, names.len()))
    }

    fn store_video(
        &mut self,
        container: &str,
        name: &str,
        video: &[u8],
    ) -> Result<(), PipelineError> {
        if !self.store.container_exists(container)? {
            self.store.create_container(container)?;
        }
        self.store.write_blob(container, name, video, true)?;
        Ok(())
    }
}
