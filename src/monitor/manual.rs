//! Hot-key manual capture: suspend streaming, fetch exactly one frame.

use super::stream::{StreamSubscriptionController, SubscriptionState};
use crate::bridge::{Bridge, BridgeError, EncodedFrame};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Process-wide hot-key registration, keyed by accelerator string
/// (e.g. `CommandOrControl+Shift+V`).
pub trait HotkeyRegistrar: Send + Sync + 'static {
    fn register(&self, accelerator: &str) -> Result<(), HotkeyError>;
    fn unregister(&self, accelerator: &str) -> Result<(), HotkeyError>;
}

pub struct ManualCaptureTrigger<H: HotkeyRegistrar> {
    accelerator: String,
    registrar: Arc<H>,
    registered: bool,
    released: bool,
    outstanding: Arc<AtomicUsize>,
}

impl<H: HotkeyRegistrar> ManualCaptureTrigger<H> {
    pub fn new(accelerator: impl Into<String>, registrar: Arc<H>) -> Self {
        Self {
            accelerator: accelerator.into(),
            registrar,
            registered: false,
            released: false,
            outstanding: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn accelerator(&self) -> &str {
        &self.accelerator
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// One-shot requests issued but not yet answered.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Registers the hot key. Effective once per window; later calls
    /// (including after `unregister`) do nothing.
    pub fn register(&mut self) -> Result<(), HotkeyError> {
        if self.registered || self.released {
            return Ok(());
        }
        self.registrar.register(&self.accelerator)?;
        self.registered = true;
        log::info!("[MANUAL] Registered {}", self.accelerator);
        Ok(())
    }

    /// Unregisters the hot key if this trigger registered it. Effective once.
    pub fn unregister(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if !self.registered {
            return;
        }
        self.registered = false;
        match self.registrar.unregister(&self.accelerator) {
            Ok(()) => log::info!("[MANUAL] Unregistered {}", self.accelerator),
            Err(e) => log::warn!("[MANUAL] Unregister {} failed: {}", self.accelerator, e),
        }
    }

    /// Hot-key handler. Suspends the stream if it is running, then issues a
    /// single one-shot request in the background; `reply` receives the answer.
    ///
    /// Overlapping activations are allowed to race. Must run inside a tokio runtime.
    pub async fn activate<B, F>(&self, stream: &mut StreamSubscriptionController<B>, reply: F)
    where
        B: Bridge,
        F: FnOnce(Result<EncodedFrame, BridgeError>) + Send + 'static,
    {
        if stream.state() == SubscriptionState::Streaming {
            stream.suspend().await;
        }

        let channel = stream.channel();
        let bridge = Arc::clone(stream.bridge());
        let outstanding = Arc::clone(&self.outstanding);
        outstanding.fetch_add(1, Ordering::AcqRel);
        log::info!("[MANUAL] One-shot frame requested for {}", channel);

        tokio::spawn(async move {
            let response = bridge.request_one_shot_frame(channel).await;
            outstanding.fetch_sub(1, Ordering::AcqRel);
            reply(response);
        });
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("Invalid hot key '{0}'")]
    Invalid(String),

    #[error("Hot key '{accelerator}' could not be registered: {reason}")]
    Registration { accelerator: String, reason: String },
}
