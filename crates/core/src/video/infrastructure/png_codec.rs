use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::shared::frame::Frame;
use crate::video::domain::codec_error::CodecError;
use crate::video::domain::still_codec::StillCodec;

/// Lossless PNG stills via the `image` crate.
///
/// Decoding accepts anything `image` recognises (PNG, JPEG, ...) and
/// normalises it to 8-bit RGB, the channel order every [`Frame`] uses.
pub struct PngCodec;

impl PngCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PngCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl StillCodec for PngCodec {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, CodecError> {
        if !frame.has_valid_shape() {
            return Err(CodecError::InvalidShape {
                width: frame.width(),
                height: frame.height(),
                len: frame.data().len(),
            });
        }

        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(
                frame.data(),
                frame.width(),
                frame.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(CodecError::Encode)?;
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Frame, CodecError> {
        let img = image::load_from_memory(bytes)
            .map_err(CodecError::Decode)?
            .into_rgb8();

        let (width, height) = img.dimensions();
        Ok(Frame::new(img.into_raw(), width, height, 0))
    }
}
