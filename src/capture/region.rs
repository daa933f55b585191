//! Pure region cropping logic.
//!
//! This module has zero infrastructure dependencies.
//! It takes pixel data in, returns pixel data out.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// A rectangle in device pixels, relative to a captured screen image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn full(image: &DynamicImage) -> Self {
        Self {
            x: 0,
            y: 0,
            width: image.width(),
            height: image.height(),
        }
    }

    /// Intersects a physical rectangle (possibly partly off-screen) with an
    /// image of the given size. Returns `None` when nothing is left.
    pub fn clamp_to(
        (x, y, width, height): (i64, i64, u64, u64),
        image_size: (u32, u32),
    ) -> Option<Self> {
        let left = x.max(0);
        let top = y.max(0);
        let right = (x + width as i64).min(image_size.0 as i64);
        let bottom = (y + height as i64).min(image_size.1 as i64);

        if right <= left || bottom <= top {
            return None;
        }

        Some(Self {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

/// Crops a `DynamicImage` to the given rectangle and returns PNG bytes.
///
/// This is a pure function with no side effects.
pub fn crop_to_png_bytes(image: &DynamicImage, rect: PixelRect) -> Result<Vec<u8>, CropError> {
    if rect.width == 0 || rect.height == 0 {
        return Err(CropError::ZeroDimension);
    }

    let (img_width, img_height) = (image.width(), image.height());

    if rect.x + rect.width > img_width || rect.y + rect.height > img_height {
        return Err(CropError::OutOfBounds {
            requested: rect,
            image_size: (img_width, img_height),
        });
    }

    let cropped = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
    encode_png(&cropped)
}

/// PNG-encodes a whole image.
fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CropError> {
    let mut png_bytes: Vec<u8> = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| CropError::EncodingFailed(e.to_string()))?;
    Ok(png_bytes)
}

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("Crop rectangle has zero width or height")]
    ZeroDimension,

    #[error(
        "Crop rectangle ({},{},{},{}) exceeds image bounds ({}x{})",
        requested.x, requested.y, requested.width, requested.height,
        image_size.0, image_size.1
    )]
    OutOfBounds {
        requested: PixelRect,
        image_size: (u32, u32),
    },

    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}
