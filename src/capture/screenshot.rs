//! Full-screen capture using the `xcap` crate.
//!
//! This is the infrastructure layer; it talks to the OS.
//! Blocking; call it from `spawn_blocking`.

use image::DynamicImage;
use xcap::Monitor;

/// A primary-monitor capture plus the scale factor needed to map
/// logical capture areas onto its pixels.
pub struct CapturedScreen {
    pub image: DynamicImage,
    pub scale_factor: f64,
}

/// Captures the primary monitor's screen.
pub fn capture_primary_monitor() -> Result<CapturedScreen, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;

    let mut first = None;
    let mut primary = None;
    for monitor in monitors {
        if monitor.is_primary().unwrap_or(false) {
            primary = Some(monitor);
            break;
        }
        if first.is_none() {
            first = Some(monitor);
        }
    }
    // Fallback: if no monitor reports as primary, use the first one
    let monitor = primary.or(first).ok_or(CaptureError::NoPrimaryMonitor)?;

    let scale_factor = monitor.scale_factor().map(f64::from).unwrap_or(1.0);
    let image = monitor
        .capture_image()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

    Ok(CapturedScreen {
        image: DynamicImage::ImageRgba8(image),
        scale_factor,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("No primary monitor found")]
    NoPrimaryMonitor,

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),
}
