//! Monitor window event loop. Ties the stream, the manual trigger and the frames together.

use super::frame::{DisplayResource, FrameError, FrameResourceManager, ResourceStore};
use super::manual::{HotkeyRegistrar, ManualCaptureTrigger};
use super::stream::{StreamSubscriptionController, SubscriptionState};
use crate::bridge::{Bridge, BridgeError, Channel, EncodedFrame, FrameSink};
use crate::events::{WeakWindowSender, WindowEvents, WindowSender};
use crate::surface::MonitorSurface;
use std::sync::Arc;

#[derive(Debug)]
pub enum MonitorEvent {
    Opened,
    Click,
    DoubleClick,
    HotkeyPressed,
    StreamFrame(EncodedFrame),
    OneShotFrame(Result<EncodedFrame, BridgeError>),
    CloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Closed,
}

/// Everything a monitor window needs besides its queue.
pub struct MonitorParts<B, H, S, R> {
    pub channel: Channel,
    pub accelerator: String,
    pub bridge: Arc<B>,
    pub hotkeys: Arc<H>,
    pub surface: Arc<S>,
    pub store: Arc<R>,
}

pub struct MonitorWindow<B, H, S, R>
where
    B: Bridge,
    H: HotkeyRegistrar,
    S: MonitorSurface,
    R: ResourceStore,
{
    stream: StreamSubscriptionController<B>,
    manual: ManualCaptureTrigger<H>,
    frames: FrameResourceManager<R>,
    surface: Arc<S>,
    sender: WeakWindowSender<MonitorEvent>,
    zoomed: bool,
    closed: bool,
}

impl<B, H, S, R> MonitorWindow<B, H, S, R>
where
    B: Bridge,
    H: HotkeyRegistrar,
    S: MonitorSurface,
    R: ResourceStore,
{
    /// `sender` must feed the queue later passed to [`MonitorWindow::run`];
    /// published frames and one-shot replies are routed through it. The
    /// window keeps only a weak handle, so the loop ends once the caller's
    /// senders are all dropped.
    pub fn new(parts: MonitorParts<B, H, S, R>, sender: &WindowSender<MonitorEvent>) -> Self {
        let sender = sender.downgrade();
        let sink_sender = sender.clone();
        let sink: FrameSink = Arc::new(move |frame| {
            sink_sender.send(MonitorEvent::StreamFrame(frame));
        });

        Self {
            stream: StreamSubscriptionController::new(parts.channel, parts.bridge, sink),
            manual: ManualCaptureTrigger::new(parts.accelerator, parts.hotkeys),
            frames: FrameResourceManager::new(parts.store),
            surface: parts.surface,
            sender,
            zoomed: false,
            closed: false,
        }
    }

    pub fn channel(&self) -> Channel {
        self.stream.channel()
    }

    pub fn state(&self) -> SubscriptionState {
        self.stream.state()
    }

    pub fn is_subscribed(&self) -> bool {
        self.stream.is_subscribed()
    }

    pub fn is_hotkey_registered(&self) -> bool {
        self.manual.is_registered()
    }

    pub fn outstanding_requests(&self) -> usize {
        self.manual.outstanding()
    }

    pub fn current_frame(&self) -> Option<&DisplayResource> {
        self.frames.current()
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Drains the queue until the window closes or the queue does.
    pub async fn run(mut self, mut events: WindowEvents<MonitorEvent>) {
        log::info!("[MONITOR] {} window running", self.channel());
        while let Some(event) = events.recv().await {
            if self.handle_event(event).await == Flow::Closed {
                break;
            }
        }
        if !self.closed {
            self.close().await;
        }
        log::info!("[MONITOR] {} window loop finished", self.channel());
    }

    /// Handles one event to completion. Events after close are ignored.
    pub async fn handle_event(&mut self, event: MonitorEvent) -> Flow {
        if self.closed {
            log::debug!("[MONITOR] {} closed; ignoring {:?}", self.channel(), event);
            return Flow::Closed;
        }

        match event {
            MonitorEvent::Opened => {
                if let Err(e) = self.manual.register() {
                    log::warn!("[MONITOR] {}: hot key unavailable: {}", self.channel(), e);
                }
                self.stream.start().await;
            }
            MonitorEvent::Click => {
                self.zoomed = !self.zoomed;
                self.surface.set_zoomed(self.zoomed);
            }
            MonitorEvent::DoubleClick => {
                self.stream.start().await;
            }
            MonitorEvent::HotkeyPressed => {
                let sender = self.sender.clone();
                self.manual
                    .activate(&mut self.stream, move |response| {
                        sender.send(MonitorEvent::OneShotFrame(response));
                    })
                    .await;
            }
            MonitorEvent::StreamFrame(frame) => {
                if self.stream.state() == SubscriptionState::Streaming {
                    self.show(&frame);
                } else {
                    log::debug!(
                        "[MONITOR] {} is {}; dropping stream frame",
                        self.channel(),
                        self.stream.state()
                    );
                }
            }
            MonitorEvent::OneShotFrame(Ok(frame)) => {
                self.show(&frame);
            }
            MonitorEvent::OneShotFrame(Err(e)) => {
                log::warn!("[MONITOR] {} one-shot request failed: {}", self.channel(), e);
            }
            MonitorEvent::CloseRequested => {
                self.close().await;
                return Flow::Closed;
            }
        }

        Flow::Continue
    }

    fn show(&mut self, frame: &EncodedFrame) {
        match self.frames.install(frame) {
            Ok(resource) => self.surface.show_frame(resource),
            Err(FrameError::Decode(e)) => {
                log::warn!(
                    "[MONITOR] {}: dropped malformed frame ({} chars): {}",
                    self.stream.channel(),
                    frame.len(),
                    e
                );
                self.stream
                    .bridge()
                    .log(&format!("{}: malformed frame dropped: {}", self.stream.channel(), e));
            }
            Err(FrameError::Closed) => {
                log::debug!("[MONITOR] {}: frame after close dropped", self.stream.channel());
            }
        }
    }

    /// Stop streaming, release the hot key, the current frame and the
    /// subscription, regardless of state.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.stream.close().await;
        self.manual.unregister();
        self.frames.close();
        self.closed = true;
        log::info!("[MONITOR] {} window closed", self.channel());
    }
}
