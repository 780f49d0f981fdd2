use thiserror::Error;

/// Failures while turning pixels into bytes or bytes into pixels.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid frame shape {width}x{height} with {len} bytes")]
    InvalidShape { width: u32, height: u32, len: usize },
    #[error("failed to encode still image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("failed to decode still image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("video codec error: {0}")]
    Video(#[from] ffmpeg_next::Error),
    #[error("{0}")]
    Stream(String),
}

impl CodecError {
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }
}
