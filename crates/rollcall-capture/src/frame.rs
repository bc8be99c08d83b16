//! Pixel format conversion and JPEG encoding for captured frames.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

const JPEG_QUALITY: u8 = 85;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Convert packed YUYV (4:2:2) to interleaved RGB8.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V], with U and V
/// shared by the pixel pair. Uses the BT.601 limited-range matrix.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for pair in yuyv[..expected].chunks_exact(4) {
        let u = pair[1] as f32 - 128.0;
        let v = pair[3] as f32 - 128.0;
        for &y in &[pair[0], pair[2]] {
            let c = y as f32 - 16.0;
            rgb.push(clamp_u8(1.164 * c + 1.596 * v));
            rgb.push(clamp_u8(1.164 * c - 0.392 * u - 0.813 * v));
            rgb.push(clamp_u8(1.164 * c + 2.017 * u));
        }
    }
    Ok(rgb)
}

fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Encode interleaved RGB8 pixels as a JPEG still.
pub fn encode_jpeg(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode(
        rgb,
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;
    Ok(out.into_inner())
}
