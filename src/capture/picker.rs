//! Capture-region picker window.
//!
//! Double-click submits the window's own screen rectangle as the capture
//! area. A long press (held past the configured threshold) resets it.

use super::geometry;
use crate::bridge::Bridge;
use crate::events::{WeakWindowSender, WindowEvents, WindowSender};
use crate::surface::{PickerStatus, PickerSurface};
use crate::timer::{self, TimerHandle, TimerId};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerEvent {
    /// The page is ready; re-sends the current status.
    Opened,
    DoubleClick,
    PressDown,
    PressUp,
    /// Posted by the long-press timer; carries the id of the arming that fired.
    LongPressElapsed(TimerId),
    CloseRequested,
}

pub struct CaptureAreaPicker<B: Bridge, S: PickerSurface> {
    bridge: Arc<B>,
    surface: Arc<S>,
    sender: WeakWindowSender<PickerEvent>,
    long_press: Duration,
    armed: Option<TimerHandle>,
    status: PickerStatus,
    closed: bool,
}

impl<B: Bridge, S: PickerSurface> CaptureAreaPicker<B, S> {
    /// Timer events go through a weak handle on `sender`; the caller keeps
    /// the queue open.
    pub fn new(
        bridge: Arc<B>,
        surface: Arc<S>,
        sender: &WindowSender<PickerEvent>,
        long_press: Duration,
    ) -> Self {
        let picker = Self {
            bridge,
            surface,
            sender: sender.downgrade(),
            long_press,
            armed: None,
            status: PickerStatus::AwaitingSelection,
            closed: false,
        };
        picker.surface.set_status(&picker.status);
        picker
    }

    pub fn status(&self) -> PickerStatus {
        self.status
    }

    pub fn is_long_press_armed(&self) -> bool {
        self.armed.as_ref().is_some_and(|t| t.is_pending())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub async fn run(mut self, mut events: WindowEvents<PickerEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
            if self.closed {
                break;
            }
        }
        self.close();
        log::info!("[PICKER] Window loop finished");
    }

    pub async fn handle_event(&mut self, event: PickerEvent) {
        if self.closed {
            return;
        }

        match event {
            PickerEvent::Opened => self.surface.set_status(&self.status),
            PickerEvent::DoubleClick => self.submit_window_area().await,
            PickerEvent::PressDown => self.arm_long_press(),
            PickerEvent::PressUp => self.disarm_long_press(),
            PickerEvent::LongPressElapsed(id) => {
                let current = self.armed.as_ref().map(|t| t.id());
                if current != Some(id) {
                    log::debug!("[PICKER] Ignoring stale long-press timer {}", id);
                    return;
                }
                self.armed = None;
                self.reset_area().await;
            }
            PickerEvent::CloseRequested => self.close(),
        }
    }

    /// Geometry is read now, not when the gesture started.
    async fn submit_window_area(&mut self) {
        let region = match self.surface.window_frame().and_then(|f| geometry::resolve(&f)) {
            Ok(region) => region,
            Err(e) => {
                log::warn!("[PICKER] Capture area not set: {}", e);
                return;
            }
        };

        if let Err(e) = self.bridge.submit_capture_area(region).await {
            log::warn!("[PICKER] Submitting capture area {} failed: {}", region, e);
            return;
        }

        log::info!("[PICKER] Capture area set to {}", region);
        self.set_status(PickerStatus::RegionSet(region));
    }

    async fn reset_area(&mut self) {
        if let Err(e) = self.bridge.reset_capture_area().await {
            log::warn!("[PICKER] Resetting capture area failed: {}", e);
            return;
        }
        log::info!("[PICKER] Capture area cleared");
        self.set_status(PickerStatus::RegionCleared);
    }

    fn arm_long_press(&mut self) {
        self.disarm_long_press();

        let sender = self.sender.clone();
        let handle = timer::arm(self.long_press, move |id| {
            sender.send(PickerEvent::LongPressElapsed(id));
        });
        self.armed = Some(handle);
    }

    fn disarm_long_press(&mut self) {
        if let Some(handle) = self.armed.take() {
            handle.cancel();
        }
    }

    fn set_status(&mut self, status: PickerStatus) {
        self.status = status;
        self.surface.set_status(&status);
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.disarm_long_press();
        self.closed = true;
        log::info!("[PICKER] Window closed");
    }
}
