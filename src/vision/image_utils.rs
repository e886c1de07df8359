// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading, RGB conversion and data URI encoding for uploads

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use thiserror::Error;

/// Prefix of every JPEG data URI echoed back to clients
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// JPEG quality used for the echoed image (matches PIL's default)
pub const JPEG_QUALITY: u8 = 75;

/// Custom error types for image processing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected source format
    pub format: ImageFormat,
    /// Size of the uploaded payload in bytes
    pub size_bytes: usize,
}

/// Decode raw upload bytes into an 8-bit RGB bitmap
///
/// The source format is detected from magic bytes, never from the filename.
/// Alpha and palette information is discarded by the RGB conversion.
///
/// # Returns
/// * `Ok((RgbImage, ImageInfo))` - The decoded RGB image and metadata
/// * `Err(ImageError)` - If the bytes are empty, unrecognised or corrupt
pub fn decode_rgb_image(bytes: &[u8]) -> Result<(RgbImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img.to_rgb8(), info))
}

/// Detect image format from magic bytes
///
/// # Returns
/// * `Ok(ImageFormat)` - Detected format
/// * `Err(ImageError::UnsupportedFormat)` - If format cannot be detected
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

/// Encode an RGB image as JPEG bytes
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
        encoder
            .encode_image(image)
            .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;
    }
    Ok(buffer.into_inner())
}

/// Re-encode an RGB image as JPEG and wrap it in a base64 data URI
///
/// # Example
/// ```ignore
/// let uri = jpeg_data_uri(&rgb)?;
/// assert!(uri.starts_with("data:image/jpeg;base64,"));
/// ```
pub fn jpeg_data_uri(image: &RgbImage) -> Result<String, ImageError> {
    let jpeg = encode_jpeg(image)?;
    Ok(format!("{}{}", JPEG_DATA_URI_PREFIX, STANDARD.encode(jpeg)))
}
