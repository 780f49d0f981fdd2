use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::codec_error::CodecError;

/// Reads frames from a video source in decode order.
///
/// Implementations handle the container and codec while the pipeline works
/// with the abstract `Frame` and `VideoMetadata` types.
pub trait VideoReader: Send {
    /// Opens a video file and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, CodecError>;

    /// Returns a lazy iterator over frames in decode order, indexed from 0.
    /// Exhausting the iterator means end of stream.
    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, CodecError>> + '_>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
