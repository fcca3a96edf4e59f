//! Product photo normalization.
//!
//! Uploaded photos arrive in whatever format the camera or browser produced.
//! They are decoded, re-encoded as PNG and stored inline as standard base64,
//! which templates render as a `data:image/png;base64,` URI.

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageFormat;
use thiserror::Error;

/// Errors that can occur while normalizing an image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The bytes are not an image in any supported format.
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The decoded image could not be written as PNG.
    #[error("could not encode image as PNG: {0}")]
    Encode(#[source] image::ImageError),
}

/// Decode `bytes` and return them as a base64 PNG.
///
/// # Errors
///
/// Returns `ImageError::Decode` if the bytes are not a decodable image.
/// Returns `ImageError::Encode` if PNG encoding fails.
pub fn encode_png_base64(bytes: &[u8]) -> Result<String, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(ImageError::Decode)?;

    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(ImageError::Encode)?;

    Ok(STANDARD.encode(png))
}

/// Like [`encode_png_base64`], but a missing or empty upload yields `""`.
///
/// # Errors
///
/// Same as [`encode_png_base64`] when bytes are present.
pub fn encode_optional(bytes: Option<&[u8]>) -> Result<String, ImageError> {
    match bytes {
        Some(bytes) if !bytes.is_empty() => encode_png_base64(bytes),
        _ => Ok(String::new()),
    }
}
