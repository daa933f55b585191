//! Window geometry → capture rectangle conversion.
//!
//! Pure functions only. The picker window reads its physical frame from the
//! presentation surface and hands it here; nothing is cached between calls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical (device-pixel) geometry of a window, as reported by the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale_factor: f64,
}

impl WindowFrame {
    pub fn new(position: (f64, f64), size: (f64, f64), scale_factor: f64) -> Self {
        Self {
            x: position.0,
            y: position.1,
            width: size.0,
            height: size.1,
            scale_factor,
        }
    }
}

/// Capture rectangle in logical (scale-independent) screen coordinates.
///
/// Always satisfies `top_left < bottom_right` on both axes; the only
/// constructor outside this module is [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRegion {
    top_left: (i32, i32),
    bottom_right: (i32, i32),
}

impl CaptureRegion {
    pub fn top_left(&self) -> (i32, i32) {
        self.top_left
    }

    pub fn bottom_right(&self) -> (i32, i32) {
        self.bottom_right
    }

    pub fn width(&self) -> u32 {
        self.bottom_right.0.abs_diff(self.top_left.0)
    }

    pub fn height(&self) -> u32 {
        self.bottom_right.1.abs_diff(self.top_left.1)
    }

    /// Scale back to device pixels, e.g. to crop a physical screenshot.
    /// Returns `(x, y, width, height)`; negative origins are kept so the
    /// caller can clamp against the actual screen.
    pub fn to_physical(&self, scale_factor: f64) -> (i64, i64, u64, u64) {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let x = (self.top_left.0 as f64 * scale).floor() as i64;
        let y = (self.top_left.1 as f64 * scale).floor() as i64;
        let right = (self.bottom_right.0 as f64 * scale).ceil() as i64;
        let bottom = (self.bottom_right.1 as f64 * scale).ceil() as i64;
        (x, y, (right - x) as u64, (bottom - y) as u64)
    }
}

impl fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] - [{}, {}]",
            self.top_left.0, self.top_left.1, self.bottom_right.0, self.bottom_right.1
        )
    }
}

/// Converts a window's physical frame into the logical capture rectangle it covers.
///
/// Position and size are divided by the scale factor. The top-left corner is
/// floored and the bottom-right corner ceiled, so the rectangle never shrinks
/// below the window. A size too small to move the far edge in floating point
/// still gives a one-unit rectangle.
///
/// # Example
/// A window at (100, 100), 400×300 physical pixels, scale 2.0 covers
/// `[50, 50] - [250, 200]`.
pub fn resolve(frame: &WindowFrame) -> Result<CaptureRegion, GeometryError> {
    if !frame.scale_factor.is_finite() || frame.scale_factor <= 0.0 {
        return Err(GeometryError::InvalidScaleFactor(frame.scale_factor));
    }
    if !(frame.width > 0.0 && frame.height > 0.0) || !frame.width.is_finite() || !frame.height.is_finite() {
        return Err(GeometryError::NonPositiveSize {
            width: frame.width,
            height: frame.height,
        });
    }
    if !frame.x.is_finite() || !frame.y.is_finite() {
        return Err(GeometryError::NonFinitePosition);
    }

    let left = frame.x / frame.scale_factor;
    let top = frame.y / frame.scale_factor;
    let right = left + frame.width / frame.scale_factor;
    let bottom = top + frame.height / frame.scale_factor;

    let top_left = (to_i32(left.floor())?, to_i32(top.floor())?);
    let bottom_right = (
        far_edge(top_left.0, to_i32(right.ceil())?)?,
        far_edge(top_left.1, to_i32(bottom.ceil())?)?,
    );
    Ok(CaptureRegion { top_left, bottom_right })
}

/// At least one unit past `near`.
fn far_edge(near: i32, far: i32) -> Result<i32, GeometryError> {
    if far > near {
        return Ok(far);
    }
    near.checked_add(1).ok_or(GeometryError::OutOfRange(f64::from(near) + 1.0))
}

fn to_i32(value: f64) -> Result<i32, GeometryError> {
    if value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(GeometryError::OutOfRange(value));
    }
    Ok(value as i32)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Window has non-positive size ({width}x{height})")]
    NonPositiveSize { width: f64, height: f64 },

    #[error("Invalid scale factor: {0}")]
    InvalidScaleFactor(f64),

    #[error("Window position is not a finite number")]
    NonFinitePosition,

    #[error("Logical coordinate {0} does not fit the screen coordinate range")]
    OutOfRange(f64),

    #[error("Window geometry unavailable: {0}")]
    Unavailable(String),
}
