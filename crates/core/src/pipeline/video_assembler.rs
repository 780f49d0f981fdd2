use std::path::Path;
use std::time::Instant;

use crate::shared::constants::OUTPUT_VIDEO_EXTENSION;
use crate::shared::frame::Frame;
use crate::shared::rates::FrameRate;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_error::PipelineError;
use super::pipeline_logger::PipelineLogger;

/// Encodes an ordered frame sequence into a single video.
///
/// The first frame fixes the output resolution; every later frame must
/// match it. Frames are pulled one at a time so only the frame being
/// encoded is held in memory.
pub struct VideoAssembler {
    writer: Box<dyn VideoWriter>,
}

impl VideoAssembler {
    pub fn new(writer: Box<dyn VideoWriter>) -> Self {
        Self { writer }
    }

    /// Encodes `frames` at `frame_rate` into a file at `output_path` and
    /// returns the number of frames written.
    ///
    /// Fails with [`PipelineError::EmptyInput`] before touching the writer
    /// when the sequence is empty.
    pub fn assemble_to_file<I>(
        &mut self,
        frames: I,
        frame_rate: FrameRate,
        output_path: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, PipelineError>
    where
        I: IntoIterator<Item = Result<Frame, PipelineError>>,
    {
        let mut frames = frames.into_iter();
        let total = known_length(&frames);
        let first = frames.next().ok_or(PipelineError::EmptyInput)??;
        let (width, height) = first.dimensions();

        let metadata = VideoMetadata::for_output(width, height, frame_rate.as_f64());
        self.writer.open(output_path, &metadata)?;
        log::debug!(
            "Assembling {width}x{height} video at {frame_rate} fps into {}",
            output_path.display()
        );

        let result = write_all(
            self.writer.as_mut(),
            std::iter::once(Ok(first)).chain(frames),
            (width, height),
            total,
            logger,
        );

        match result {
            Ok(written) => {
                self.writer.close()?;
                Ok(written)
            }
            Err(e) => {
                if let Err(close_err) = self.writer.close() {
                    log::warn!("Closing writer after failed assembly: {close_err}");
                }
                Err(e)
            }
        }
    }

    /// Same as [`assemble_to_file`](Self::assemble_to_file), but encodes
    /// into a scratch file and returns the finished video's bytes.
    pub fn assemble<I>(
        &mut self,
        frames: I,
        frame_rate: FrameRate,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<u8>, PipelineError>
    where
        I: IntoIterator<Item = Result<Frame, PipelineError>>,
    {
        let scratch = tempfile::tempdir().map_err(PipelineError::io(std::env::temp_dir()))?;
        let path = scratch
            .path()
            .join(format!("assembled.{OUTPUT_VIDEO_EXTENSION}"));

        self.assemble_to_file(frames, frame_rate, &path, logger)?;
        std::fs::read(&path).map_err(PipelineError::io(&path))
    }
}

/// Exact length of `frames` when the iterator knows it, otherwise 0.
fn known_length(frames: &impl Iterator) -> usize {
    match frames.size_hint() {
        (lower, Some(upper)) if lower == upper => upper,
        _ => 0,
    }
}

fn write_all(
    writer: &mut dyn VideoWriter,
    frames: impl Iterator<Item = Result<Frame, PipelineError>>,
    (width, height): (u32, u32),
    total: usize,
    logger: &mut dyn PipelineLogger,
) -> Result<usize, PipelineError> {
    let mut written = 0;
    for (position, frame) in frames.enumerate() {
        let frame = frame?;
        if frame.dimensions() != (width, height) {
            return Err(PipelineError::DimensionMismatch {
                index: position,
                expected_width: width,
                expected_height: height,
                actual_width: frame.width(),
                actual_height: frame.height(),
            });
        }

        let t0 = Instant::now();
        writer.write(&frame)?;
        logger.timing("encode", t0.elapsed().as_secs_f64() * 1000.0);

        written += 1;
        logger.progress(written, total);
    }
    Ok(written)
}
