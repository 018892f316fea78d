//! Image codec: raw bitmaps to a portable base64 PNG encoding and back

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageFormat;
use thiserror::Error;

/// The in-memory raw-image-handle carried by image turns. Pixel-exact
/// equality is well-defined, which the round-trip contract relies on.
pub type RawImage = image::RgbaImage;

/// Errors from encoding, decoding, or validating image data
#[derive(Error, Debug)]
pub enum CodecError {
    /// Corrupt or unsupported image byte layout
    #[error("unsupported or corrupt image data: {0}")]
    Image(#[from] image::ImageError),

    /// Encoded string is not valid base64
    #[error("invalid base64 encoding: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Serialize a raw image into a self-contained textual encoding: PNG bytes,
/// base64-encoded. Deterministic for a given bitmap, lossless.
pub fn encode(image: &RawImage) -> Result<String, CodecError> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(STANDARD.encode(&png))
}

/// Exact inverse of [`encode`]: reconstruct the raw image, pixel for pixel.
pub fn decode(encoded: &str) -> Result<RawImage, CodecError> {
    let bytes = STANDARD.decode(encoded)?;
    load(&bytes)
}

/// Validate and decode an uploaded image file (any common raster format)
/// into a raw bitmap. Fails with [`CodecError`] on corrupt or unsupported
/// input; the caller treats that as recoverable.
pub fn load(bytes: &[u8]) -> Result<RawImage, CodecError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn test_image() -> RawImage {
        let mut img = RawImage::new(3, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        img.put_pixel(2, 0, Rgba([0, 0, 255, 255]));
        img.put_pixel(0, 1, Rgba([10, 20, 30, 128]));
        img
    }

    #[test]
    fn test_round_trip_is_pixel_exact() {
        let original = test_image();
        let encoded = encode(&original).unwrap();
        let restored = decode(&encoded).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let img = test_image();
        assert_eq!(encode(&img).unwrap(), encode(&img).unwrap());
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert!(matches!(
            decode("not@valid@base64!"),
            Err(CodecError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_image_payload() {
        let encoded = STANDARD.encode(b"this is not a png");
        assert!(matches!(decode(&encoded), Err(CodecError::Image(_))));
    }

    #[test]
    fn test_load_rejects_corrupt_bytes() {
        assert!(load(&[0x89, 0x50, 0x4e, 0x47, 0x00]).is_err());
    }

    #[test]
    fn test_load_accepts_png_bytes() {
        let img = test_image();
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let loaded = load(&png).unwrap();
        assert_eq!(loaded, img);
    }
}
