//! Surfaces that forward to a window's webview as events.

use crate::capture::geometry::{GeometryError, WindowFrame};
use crate::monitor::frame::DisplayResource;
use crate::surface::{MonitorSurface, PickerStatus, PickerSurface};
use serde::Serialize;
use tauri::{AppHandle, Emitter, EventTarget, WebviewWindow};

#[derive(Clone, Serialize)]
struct DisplayFrame<'a> {
    url: &'a str,
    mime: &'a str,
}

#[derive(Clone, Serialize)]
struct DisplayZoom {
    zoomed: bool,
}

#[derive(Clone, Serialize)]
struct StatusLines {
    first: String,
    second: String,
}

pub struct WebviewMonitorSurface {
    app: AppHandle,
    label: String,
}

impl WebviewMonitorSurface {
    pub fn new(app: AppHandle, label: impl Into<String>) -> Self {
        Self {
            app,
            label: label.into(),
        }
    }

    fn emit<P: Serialize + Clone>(&self, event: &str, payload: P) {
        let target = EventTarget::webview_window(self.label.as_str());
        if let Err(e) = self.app.emit_to(target, event, payload) {
            log::warn!("[DESKTOP] {} to {} failed: {}", event, self.label, e);
        }
    }
}

impl MonitorSurface for WebviewMonitorSurface {
    fn show_frame(&self, resource: &DisplayResource) {
        self.emit(
            "display-frame",
            DisplayFrame {
                url: resource.url(),
                mime: resource.mime(),
            },
        );
    }

    fn set_zoomed(&self, zoomed: bool) {
        self.emit("display-zoom", DisplayZoom { zoomed });
    }
}

pub struct WebviewPickerSurface {
    window: WebviewWindow,
}

impl WebviewPickerSurface {
    pub fn new(window: WebviewWindow) -> Self {
        Self { window }
    }
}

impl PickerSurface for WebviewPickerSurface {
    fn window_frame(&self) -> Result<WindowFrame, GeometryError> {
        let unavailable = |e: tauri::Error| GeometryError::Unavailable(e.to_string());
        let position = self.window.outer_position().map_err(unavailable)?;
        let size = self.window.outer_size().map_err(unavailable)?;
        let scale = self.window.scale_factor().map_err(unavailable)?;

        Ok(WindowFrame::new(
            (f64::from(position.x), f64::from(position.y)),
            (f64::from(size.width), f64::from(size.height)),
            scale,
        ))
    }

    fn set_status(&self, status: &PickerStatus) {
        let (first, second) = status.lines();
        let target = EventTarget::webview_window(self.window.label());
        if let Err(e) = self
            .window
            .emit_to(target, "picker-status", StatusLines { first, second })
        {
            log::warn!("[DESKTOP] picker-status failed: {}", e);
        }
    }
}
