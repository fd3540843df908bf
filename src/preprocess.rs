//! Decoding and preprocessing of base64 image payloads into model input

use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use image::imageops::FilterType;

/// Decode a base64 payload into raw encoded-image bytes. Surrounding
/// whitespace is stripped first
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    Ok(general_purpose::STANDARD.decode(payload.trim())?)
}

/// Decode image bytes, convert to RGB and force-resize to `size` x `size`.
/// Returns row-major interleaved channels scaled to [0, 1]
pub fn image_to_pixels(bytes: &[u8], size: u32) -> Result<Vec<f32>> {
    let img = image::load_from_memory(bytes)?
        .resize_exact(size, size, FilterType::CatmullRom)
        .to_rgb8();

    Ok(img.as_raw().iter().map(|v| *v as f32 / 255.0).collect())
}
