//! [`Bridge`] backed by the in-process capture engine and the Tauri event bus.

use super::engine::CaptureEngine;
use crate::bridge::{Bridge, BridgeError, Channel, EncodedFrame, FramePayload, FrameSink, Subscription};
use crate::capture::geometry::CaptureRegion;
use std::sync::Arc;
use tauri::{AppHandle, Listener};

pub struct TauriBridge {
    app: AppHandle,
    engine: Arc<CaptureEngine>,
}

impl TauriBridge {
    pub fn new(app: AppHandle, engine: Arc<CaptureEngine>) -> Self {
        Self { app, engine }
    }
}

impl Bridge for TauriBridge {
    async fn submit_capture_area(&self, region: CaptureRegion) -> Result<(), BridgeError> {
        self.engine.set_capture_area(Some(region));
        Ok(())
    }

    async fn reset_capture_area(&self) -> Result<(), BridgeError> {
        self.engine.set_capture_area(None);
        Ok(())
    }

    async fn set_stream_required(&self, channel: Channel, required: bool) -> Result<(), BridgeError> {
        self.engine.set_required(channel, required);
        Ok(())
    }

    async fn request_one_shot_frame(&self, channel: Channel) -> Result<EncodedFrame, BridgeError> {
        self.engine
            .render_once(channel)
            .await
            .map_err(|e| BridgeError::Unavailable(e.to_string()))
    }

    fn subscribe(&self, channel: Channel, sink: FrameSink) -> Result<Subscription, BridgeError> {
        let id = self.app.listen_any(channel.event_name(), move |event| {
            match serde_json::from_str::<FramePayload>(event.payload()) {
                Ok(payload) => sink(payload.frame),
                Err(e) => log::warn!("[BRIDGE] Unreadable {} payload: {}", channel, e),
            }
        });
        log::debug!("[BRIDGE] Subscribed to {}", channel);

        let app = self.app.clone();
        Ok(Subscription::new(channel, move || app.unlisten(id)))
    }

    fn log(&self, message: &str) {
        log::info!("[BRIDGE] {}", message);
    }
}
