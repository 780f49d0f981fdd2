use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::codec_error::CodecError;

/// Output sink for encoded video. Frames are written in the order given.
pub trait VideoWriter: Send {
    /// Opens a sink at `path` configured from `metadata` (width, height, fps).
    fn open(&mut self, path: &Path, metadata: &VideoMetadata) -> Result<(), CodecError>;

    fn write(&mut self, frame: &Frame) -> Result<(), CodecError>;

    /// Flushes buffered packets and finalizes the container.
    fn close(&mut self) -> Result<(), CodecError>;
}
