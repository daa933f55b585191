//! Per-window continuous frame subscription.
//!
//! One controller per monitor window. The state enum is the guard that makes
//! `start`/`stop` idempotent; the window's event queue runs handlers one at a
//! time, so no locking is needed.

use crate::bridge::{Bridge, Channel, FrameSink, Subscription};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Stopped,
    Streaming,
    /// Continuous production paused for a manual capture.
    Suspended,
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubscriptionState::Stopped => "stopped",
            SubscriptionState::Streaming => "streaming",
            SubscriptionState::Suspended => "suspended",
        };
        f.write_str(name)
    }
}

pub struct StreamSubscriptionController<B: Bridge> {
    channel: Channel,
    bridge: Arc<B>,
    sink: FrameSink,
    state: SubscriptionState,
    subscription: Option<Subscription>,
}

impl<B: Bridge> StreamSubscriptionController<B> {
    pub fn new(channel: Channel, bridge: Arc<B>, sink: FrameSink) -> Self {
        Self {
            channel,
            bridge,
            sink,
            state: SubscriptionState::Stopped,
            subscription: None,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    pub fn bridge(&self) -> &Arc<B> {
        &self.bridge
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribe (once), signal interest, then mark streaming.
    /// No-op while already streaming.
    pub async fn start(&mut self) {
        if self.state == SubscriptionState::Streaming {
            log::debug!("[STREAM] {} already streaming", self.channel);
            return;
        }

        if self.subscription.is_none() {
            match self.bridge.subscribe(self.channel, Arc::clone(&self.sink)) {
                Ok(subscription) => self.subscription = Some(subscription),
                Err(e) => {
                    log::warn!("[STREAM] Subscribe to {} failed: {}", self.channel, e);
                    return;
                }
            }
        }

        if let Err(e) = self.bridge.set_stream_required(self.channel, true).await {
            log::warn!("[STREAM] Could not start {}: {}", self.channel, e);
            return;
        }

        log::info!("[STREAM] {}: {} -> streaming", self.channel, self.state);
        self.state = SubscriptionState::Streaming;
    }

    /// Pause continuous production for a manual capture. Only acts while streaming.
    pub async fn suspend(&mut self) {
        if self.state != SubscriptionState::Streaming {
            return;
        }

        if let Err(e) = self.bridge.set_stream_required(self.channel, false).await {
            log::warn!("[STREAM] Could not suspend {}: {}", self.channel, e);
            return;
        }

        log::info!("[STREAM] {}: streaming -> suspended", self.channel);
        self.state = SubscriptionState::Suspended;
    }

    /// Back to continuous mode after a suspend. Only acts while suspended.
    pub async fn resume(&mut self) {
        if self.state != SubscriptionState::Suspended {
            return;
        }
        self.start().await;
    }

    /// Withdraw interest and mark stopped. The "not required" signal is
    /// best-effort; the local state always ends `Stopped`.
    pub async fn stop(&mut self) {
        if self.state == SubscriptionState::Stopped {
            return;
        }

        // Suspended already told the bridge production is not required.
        if self.state == SubscriptionState::Streaming {
            if let Err(e) = self.bridge.set_stream_required(self.channel, false).await {
                log::warn!("[STREAM] Stop signal for {} failed: {}", self.channel, e);
            }
        }

        log::info!("[STREAM] {}: {} -> stopped", self.channel, self.state);
        self.state = SubscriptionState::Stopped;
    }

    /// Window teardown: stop and release the subscription. Idempotent.
    pub async fn close(&mut self) {
        self.stop().await;
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
