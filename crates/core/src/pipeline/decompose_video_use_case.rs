use std::path::Path;
use std::time::Instant;

use crate::session::session_state::{ResultLocation, Screen, SessionState};
use crate::shared::constants::still_name;
use crate::shared::rates::SkipRate;
use crate::storage::domain::blob_store::BlobStore;
use crate::storage::domain::working_container::{
    allocate_container_name, prepare_working_container,
};
use crate::video::domain::frame_sampler::sample;
use crate::video::domain::still_codec::StillCodec;
use crate::video::domain::video_reader::VideoReader;

use super::conversion_settings::{ConversionSettings, EncodeFailurePolicy};
use super::pipeline_error::PipelineError;
use super::pipeline_logger::PipelineLogger;
use super::session_results::{abandon_run, commit_result};

/// Outcome of one Decompose run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecomposeReport {
    /// Container now holding the stills.
    pub location: ResultLocation,
    /// Frames decoded from the video.
    pub frames_seen: usize,
    /// Stills stored in the container.
    pub frames_written: usize,
    /// Sampled frames dropped because they failed to encode.
    pub frames_skipped: usize,
}

/// Video → sampled stills pipeline: clear container → decode → sample →
/// encode PNG → store as `frame<index>.png` → record in the session.
pub struct DecomposeVideoUseCase {
    reader: Box<dyn VideoReader>,
    codec: Box<dyn StillCodec>,
    store: Box<dyn BlobStore>,
    settings: ConversionSettings,
}

impl DecomposeVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        codec: Box<dyn StillCodec>,
        store: Box<dyn BlobStore>,
        settings: ConversionSettings,
    ) -> Self {
        Self {
            reader,
            codec,
            store,
            settings,
        }
    }

    /// Decomposes the video at `video_path`, keeping every `skip_rate`-th
    /// frame starting with frame 0, and records the stills as the session's
    /// Decompose result.
    ///
    /// The container is cleared before decoding starts. If the run then
    /// fails and the previous result lived there, the screen goes back to
    /// idle instead of pointing at partial stills.
    pub fn execute(
        &mut self,
        video_path: &Path,
        skip_rate: SkipRate,
        session: &mut SessionState,
        logger: &mut dyn PipelineLogger,
    ) -> Result<DecomposeReport, PipelineError> {
        let isolated = self.settings.isolate_requests;
        let container =
            allocate_container_name(&self.settings.extracted_frames_container, isolated);

        match self.decompose_into(&container, video_path, skip_rate, logger) {
            Ok(report) => {
                commit_result(
                    &mut *self.store,
                    session,
                    Screen::Decompose,
                    report.location.clone(),
                );
                Ok(report)
            }
            Err(e) => {
                abandon_run(&mut *self.store, session, &[container.as_str()], isolated);
                Err(e)
            }
        }
    }

    /// Stages uploaded video bytes in a scratch file and decomposes it.
    ///
    /// The scratch file keeps the upload's extension so the demuxer can
    /// detect its format, and is removed whether or not the run succeeds.
    pub fn execute_upload(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        skip_rate: SkipRate,
        session: &mut SessionState,
        logger: &mut dyn PipelineLogger,
    ) -> Result<DecomposeReport, PipelineError> {
        let suffix = Path::new(file_name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut staged = tempfile::Builder::new()
            .prefix("framecast-upload-")
            .suffix(&suffix)
            .tempfile()
            .map_err(PipelineError::io(std::env::temp_dir()))?;
        std::io::Write::write_all(&mut staged, bytes)
            .map_err(PipelineError::io(staged.path()))?;

        self.execute(staged.path(), skip_rate, session, logger)
    }

    fn decompose_into(
        &mut self,
        container: &str,
        video_path: &Path,
        skip_rate: SkipRate,
        logger: &mut dyn PipelineLogger,
    ) -> Result<DecomposeReport, PipelineError> {
        let cleared = prepare_working_container(&mut *self.store, container)?;
        if cleared > 0 {
            log::debug!("Cleared {cleared} blobs from '{container}'");
        }

        let metadata = self.reader.open(video_path)?;
        logger.info(&format!(
            "Decomposing {} ({}x{}, {:.2} fps, ~{} frames) with skip rate {skip_rate}",
            video_path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames,
        ));

        let result = self.store_samples(container, skip_rate, metadata.total_frames, logger);
        self.reader.close();
        let (frames_seen, frames_written, frames_skipped) = result?;

        logger.info(&format!(
            "Stored {frames_written} of {frames_seen} frames in '{container}'"
        ));
        logger.summary();

        Ok(DecomposeReport {
            location: ResultLocation {
                container: container.to_string(),
                blob: None,
            },
            frames_seen,
            frames_written,
            frames_skipped,
        })
    }

    fn store_samples(
        &mut self,
        container: &str,
        skip_rate: SkipRate,
        total_frames: usize,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(usize, usize, usize), PipelineError> {
        let mut samples = sample(self.reader.frames(), skip_rate);
        let mut written = 0;
        let mut skipped = 0;

        let mut t0 = Instant::now();
        for item in samples.by_ref() {
            let (index, frame) = item?;
            logger.timing("decode", t0.elapsed().as_secs_f64() * 1000.0);

            let t_encode = Instant::now();
            let encoded = match self.codec.encode(&frame) {
                Ok(bytes) => bytes,
                Err(e) => match self.settings.encode_failure {
                    EncodeFailurePolicy::Abort => return Err(e.into()),
                    EncodeFailurePolicy::SkipAndLog => {
                        log::warn!("Skipping frame {index}: {e}");
                        skipped += 1;
                        t0 = Instant::now();
                        continue;
                    }
                },
            };
            logger.timing("encode", t_encode.elapsed().as_secs_f64() * 1000.0);
            logger.metric("still_bytes", encoded.len() as f64);

            let t_upload = Instant::now();
            self.store
                .write_blob(container, &still_name(index), &encoded, false)?;
            logger.timing("upload", t_upload.elapsed().as_secs_f64() * 1000.0);

            written += 1;
            logger.progress(index + 1, total_frames);
            t0 = Instant::now();
        }

        Ok((samples.frames_seen(), written, skipped))
    }
}
