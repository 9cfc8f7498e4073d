// THEORY:
// A `Frame` is the most fundamental unit the engine accepts: one RGB image from
// the capture loop, valid for exactly one iteration. It is a "dumb" data
// container with a single heuristic of its own, the per-pixel intensity, which
// is the only channel the rest of the pipeline looks at.
//
// Construction is the one place where raw buffers are validated. Everything
// downstream may assume non-zero dimensions and a complete buffer, so a
// truncated or empty buffer is rejected here as `InvalidFrame` rather than
// panicking deep inside the blur or the background model.

use crate::error::{Result, TrainerError};
use image::{GrayImage, Luma, RgbImage};
use std::path::Path;

const RGB_CHANNELS: usize = 3;
const RGBA_CHANNELS: usize = 4;

/// Intensity estimate (Rec. 601 luma) of a single RGB sample, on a 0..255 scale.
#[inline]
pub fn luminance(red: u8, green: u8, blue: u8) -> f64 {
    0.299_f64 * red as f64 + 0.587_f64 * green as f64 + 0.114_f64 * blue as f64
}

/// One color video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wraps an already decoded RGB image.
    pub fn from_image(image: RgbImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(TrainerError::InvalidFrame(format!(
                "frame has zero size ({}x{})",
                image.width(),
                image.height()
            )));
        }
        Ok(Self { image })
    }

    /// Builds a frame from a tightly packed RGB buffer.
    pub fn from_rgb_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        check_buffer_len(width, height, bytes.len(), RGB_CHANNELS)?;
        let image = RgbImage::from_raw(width, height, bytes).ok_or_else(|| {
            TrainerError::InvalidFrame(format!("cannot view buffer as {width}x{height} RGB"))
        })?;
        Self::from_image(image)
    }

    /// Builds a frame from a tightly packed RGBA buffer; alpha is discarded.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        check_buffer_len(width, height, bytes.len(), RGBA_CHANNELS)?;
        let rgb: Vec<u8> = bytes
            .chunks_exact(RGBA_CHANNELS)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Self::from_rgb_bytes(width, height, rgb)
    }

    /// Decodes a still image from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path)?.into_rgb8();
        Self::from_image(image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    /// Single-channel intensity image of the same dimensions.
    pub fn intensity(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            let [r, g, b] = self.image.get_pixel(x, y).0;
            Luma([luminance(r, g, b).round().clamp(0.0, 255.0) as u8])
        })
    }
}

fn check_buffer_len(width: u32, height: u32, len: usize, channels: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(TrainerError::InvalidFrame(format!(
            "frame has zero size ({width}x{height})"
        )));
    }
    let expected = width as usize * height as usize * channels;
    if len != expected {
        return Err(TrainerError::InvalidFrame(format!(
            "expected {expected} bytes for {width}x{height}x{channels}, got {len}"
        )));
    }
    Ok(())
}
