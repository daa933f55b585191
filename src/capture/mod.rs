//! Capture-area domain: public API.
//!
//! Geometry and cropping are pure; the picker window drives them from user
//! gestures. Screen grabbing (`screenshot`) only exists in desktop builds.

pub mod geometry;
pub mod picker;
pub mod region;
#[cfg(feature = "desktop")]
pub mod screenshot;

pub use geometry::{resolve, CaptureRegion, GeometryError, WindowFrame};
pub use picker::{CaptureAreaPicker, PickerEvent};
pub use region::{crop_to_png_bytes, CropError, PixelRect};
