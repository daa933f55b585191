//! Presentation surface seams: what renders frames and reports geometry.

use crate::capture::geometry::{CaptureRegion, GeometryError, WindowFrame};
use crate::monitor::frame::DisplayResource;

/// A monitor window's image area.
pub trait MonitorSurface: Send + Sync + 'static {
    /// Bind the image element to `resource`. The previous resource may
    /// already be released when this is called.
    fn show_frame(&self, resource: &DisplayResource);

    /// `true` shows the frame at natural size, `false` fits it to the window.
    fn set_zoomed(&self, zoomed: bool);
}

/// The capture-region picker window.
pub trait PickerSurface: Send + Sync + 'static {
    /// Physical outer frame of the window, read fresh on every call.
    fn window_frame(&self) -> Result<WindowFrame, GeometryError>;

    fn set_status(&self, status: &PickerStatus);
}

/// What the picker window tells the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerStatus {
    AwaitingSelection,
    RegionSet(CaptureRegion),
    RegionCleared,
}

impl PickerStatus {
    /// The two status lines shown in the picker window.
    pub fn lines(&self) -> (String, String) {
        match self {
            PickerStatus::AwaitingSelection => (
                "Double click: Set capture area".to_string(),
                "Long press: Reset capture area".to_string(),
            ),
            PickerStatus::RegionSet(region) => ("Capture area set".to_string(), region.to_string()),
            PickerStatus::RegionCleared => ("Capture area cleared".to_string(), String::new()),
        }
    }
}
