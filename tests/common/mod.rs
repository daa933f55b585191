//! Recording test doubles for the bridge, surfaces, store and hot keys.

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbImage};
use scope_monitor_lib::bridge::{Bridge, BridgeError, Channel, EncodedFrame, FrameSink, Subscription};
use scope_monitor_lib::capture::{CaptureRegion, GeometryError, WindowFrame};
use scope_monitor_lib::monitor::frame::DisplayResource;
use scope_monitor_lib::monitor::{HotkeyError, HotkeyRegistrar, ResourceHandle, ResourceStore};
use scope_monitor_lib::surface::{MonitorSurface, PickerStatus, PickerSurface};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn png_frame(side: u32) -> EncodedFrame {
    let img = DynamicImage::ImageRgb8(RgbImage::new(side, side));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    EncodedFrame::new(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

pub fn garbage_frame() -> EncodedFrame {
    EncodedFrame::new("data:image/png;base64,%%%not-base64%%%")
}

// ── Bridge ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Submit(CaptureRegion),
    Reset,
    Required(Channel, bool),
    OneShot(Channel),
}

#[derive(Default)]
pub struct MockBridge {
    calls: Mutex<Vec<Call>>,
    logs: Mutex<Vec<String>>,
    sinks: Arc<Mutex<HashMap<u64, (Channel, FrameSink)>>>,
    next_sink: AtomicU64,
    subscribes: AtomicUsize,
    unsubscribes: Arc<AtomicUsize>,
    pub fail_required: AtomicBool,
    pub fail_subscribe: AtomicBool,
    pub fail_submit: AtomicBool,
    one_shot_replies: Mutex<VecDeque<Result<EncodedFrame, BridgeError>>>,
    one_shot_delay: Mutex<Duration>,
}

impl MockBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn required_calls(&self) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Required(_, required) => Some(required),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap().clone()
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }

    pub fn live_sinks(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    /// Delivers `frame` to every live sink on `channel`, like a published event.
    pub fn publish(&self, channel: Channel, frame: EncodedFrame) -> usize {
        let sinks: Vec<FrameSink> = self
            .sinks
            .lock()
            .unwrap()
            .values()
            .filter(|(c, _)| *c == channel)
            .map(|(_, sink)| Arc::clone(sink))
            .collect();
        for sink in &sinks {
            sink(frame.clone());
        }
        sinks.len()
    }

    /// Queues the reply for the next one-shot request; unqueued requests get a small PNG.
    pub fn queue_one_shot(&self, reply: Result<EncodedFrame, BridgeError>) {
        self.one_shot_replies.lock().unwrap().push_back(reply);
    }

    pub fn set_one_shot_delay(&self, delay: Duration) {
        *self.one_shot_delay.lock().unwrap() = delay;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn unavailable(what: &str) -> BridgeError {
    BridgeError::Unavailable(what.to_string())
}

impl Bridge for MockBridge {
    async fn submit_capture_area(&self, region: CaptureRegion) -> Result<(), BridgeError> {
        self.record(Call::Submit(region));
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(unavailable("submit"));
        }
        Ok(())
    }

    async fn reset_capture_area(&self) -> Result<(), BridgeError> {
        self.record(Call::Reset);
        Ok(())
    }

    async fn set_stream_required(&self, channel: Channel, required: bool) -> Result<(), BridgeError> {
        self.record(Call::Required(channel, required));
        if self.fail_required.load(Ordering::SeqCst) {
            return Err(unavailable("required"));
        }
        Ok(())
    }

    async fn request_one_shot_frame(&self, channel: Channel) -> Result<EncodedFrame, BridgeError> {
        self.record(Call::OneShot(channel));
        let delay = *self.one_shot_delay.lock().unwrap();
        let reply = self.one_shot_replies.lock().unwrap().pop_front();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply.unwrap_or_else(|| Ok(png_frame(2)))
    }

    fn subscribe(&self, channel: Channel, sink: FrameSink) -> Result<Subscription, BridgeError> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(unavailable("subscribe"));
        }
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        let id = self.next_sink.fetch_add(1, Ordering::SeqCst);
        self.sinks.lock().unwrap().insert(id, (channel, sink));

        let sinks = Arc::clone(&self.sinks);
        let unsubscribes = Arc::clone(&self.unsubscribes);
        Ok(Subscription::new(channel, move || {
            sinks.lock().unwrap().remove(&id);
            unsubscribes.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn log(&self, message: &str) {
        self.logs.lock().unwrap().push(message.to_string());
    }
}

// ── Resource store ──────────────────────────────────────────────────

#[derive(Default)]
pub struct CountingStore {
    next: AtomicU64,
    live: Mutex<HashSet<ResourceHandle>>,
    created: AtomicUsize,
    released: Mutex<Vec<ResourceHandle>>,
    double_releases: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn live(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn is_live(&self, handle: &ResourceHandle) -> bool {
        self.live.lock().unwrap().contains(handle)
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> Vec<ResourceHandle> {
        self.released.lock().unwrap().clone()
    }

    pub fn double_releases(&self) -> usize {
        self.double_releases.load(Ordering::SeqCst)
    }
}

impl ResourceStore for CountingStore {
    fn create(&self, _bytes: Vec<u8>, _mime: &'static str) -> ResourceHandle {
        let id = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = ResourceHandle::new(format!("mem://{}", id));
        self.created.fetch_add(1, Ordering::SeqCst);
        self.live.lock().unwrap().insert(handle.clone());
        handle
    }

    fn release(&self, handle: &ResourceHandle) {
        if !self.live.lock().unwrap().remove(handle) {
            self.double_releases.fetch_add(1, Ordering::SeqCst);
        }
        self.released.lock().unwrap().push(handle.clone());
    }
}

// ── Surfaces ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingMonitorSurface {
    shown: Mutex<Vec<ResourceHandle>>,
    zoom: Mutex<Vec<bool>>,
}

impl RecordingMonitorSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn shown(&self) -> Vec<ResourceHandle> {
        self.shown.lock().unwrap().clone()
    }

    pub fn zoom_changes(&self) -> Vec<bool> {
        self.zoom.lock().unwrap().clone()
    }
}

impl MonitorSurface for RecordingMonitorSurface {
    fn show_frame(&self, resource: &DisplayResource) {
        self.shown.lock().unwrap().push(resource.handle().clone());
    }

    fn set_zoomed(&self, zoomed: bool) {
        self.zoom.lock().unwrap().push(zoomed);
    }
}

#[derive(Default)]
pub struct RecordingPickerSurface {
    frame: Mutex<Option<WindowFrame>>,
    statuses: Mutex<Vec<PickerStatus>>,
}

impl RecordingPickerSurface {
    pub fn new(frame: Option<WindowFrame>) -> Arc<Self> {
        Arc::new(Self {
            frame: Mutex::new(frame),
            statuses: Mutex::new(Vec::new()),
        })
    }

    /// Simulates the user moving or resizing the window.
    pub fn move_to(&self, frame: WindowFrame) {
        *self.frame.lock().unwrap() = Some(frame);
    }

    pub fn statuses(&self) -> Vec<PickerStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<PickerStatus> {
        self.statuses.lock().unwrap().last().copied()
    }
}

impl PickerSurface for RecordingPickerSurface {
    fn window_frame(&self) -> Result<WindowFrame, GeometryError> {
        self.frame
            .lock()
            .unwrap()
            .ok_or_else(|| GeometryError::Unavailable("window gone".to_string()))
    }

    fn set_status(&self, status: &PickerStatus) {
        self.statuses.lock().unwrap().push(*status);
    }
}

// ── Hot keys ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockHotkeys {
    registered: Mutex<HashSet<String>>,
    register_calls: AtomicUsize,
    unregister_calls: AtomicUsize,
    pub fail_register: AtomicBool,
}

impl MockHotkeys {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_registered(&self, accelerator: &str) -> bool {
        self.registered.lock().unwrap().contains(accelerator)
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn unregister_calls(&self) -> usize {
        self.unregister_calls.load(Ordering::SeqCst)
    }
}

impl HotkeyRegistrar for MockHotkeys {
    fn register(&self, accelerator: &str) -> Result<(), HotkeyError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(HotkeyError::Registration {
                accelerator: accelerator.to_string(),
                reason: "taken by another app".to_string(),
            });
        }
        self.registered.lock().unwrap().insert(accelerator.to_string());
        Ok(())
    }

    fn unregister(&self, accelerator: &str) -> Result<(), HotkeyError> {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        self.registered.lock().unwrap().remove(accelerator);
        Ok(())
    }
}
