use crate::shared::frame::Frame;
use crate::video::domain::codec_error::CodecError;

/// Converts frames to and from a compressed still-image representation.
///
/// No resizing or color-space conversion happens in either direction.
pub trait StillCodec: Send {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, CodecError>;

    /// Decodes a still into a frame with index 0.
    fn decode(&self, bytes: &[u8]) -> Result<Frame, CodecError>;
}
