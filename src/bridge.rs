//! The boundary to the capture/analysis collaborator.
//!
//! Request/response calls are async and may fail with [`BridgeError`].
//! Published frames arrive through [`Bridge::subscribe`], which returns a
//! [`Subscription`] whose release runs exactly once.

use crate::capture::geometry::CaptureRegion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A named stream of published frames, one per monitor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    VectorScope,
    Waveform,
    CapturePreview,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::VectorScope, Channel::Waveform, Channel::CapturePreview];

    /// Event name the frames of this channel are published under.
    pub fn event_name(&self) -> &'static str {
        match self {
            Channel::VectorScope => "vector-scope",
            Channel::Waveform => "waveform",
            Channel::CapturePreview => "capture-preview",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Opaque encoded image: base64, optionally behind a `data:...;base64,` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedFrame(String);

impl EncodedFrame {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Payload published on every channel: `{ "frame": "<encoded>" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramePayload {
    pub frame: EncodedFrame,
}

/// Callback the bridge invokes for every published frame.
pub type FrameSink = Arc<dyn Fn(EncodedFrame) + Send + Sync>;

pub trait Bridge: Send + Sync + 'static {
    fn submit_capture_area(
        &self,
        region: CaptureRegion,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn reset_capture_area(&self) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Interest signal: the collaborator should (not) keep producing frames
    /// for `channel`. Not a pull.
    fn set_stream_required(
        &self,
        channel: Channel,
        required: bool,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn request_one_shot_frame(
        &self,
        channel: Channel,
    ) -> impl Future<Output = Result<EncodedFrame, BridgeError>> + Send;

    fn subscribe(&self, channel: Channel, sink: FrameSink) -> Result<Subscription, BridgeError>;

    /// Diagnostic only.
    fn log(&self, message: &str);
}

/// Scoped registration on a channel. Released exactly once: by
/// [`Subscription::unsubscribe`] or, failing that, on drop.
pub struct Subscription {
    channel: Channel,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new<F>(channel: Channel, release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            channel,
            release: Some(Box::new(release)),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn unsubscribe(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if let Some(release) = self.release.take() {
            log::debug!("[BRIDGE] Unsubscribing from {}", self.channel);
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("released", &self.release.is_none())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Bridge unavailable: {0}")]
    Unavailable(String),
}
