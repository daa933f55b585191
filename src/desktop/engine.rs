//! In-process frame producer standing in for the analysis collaborator.
//!
//! Holds the capture area and the set of channels some window wants. While
//! at least one channel is wanted, a worker ticks on a fixed interval. Ticks
//! where some wanted channel has a renderer capture the primary monitor,
//! render those channels and publish the frames.

use crate::bridge::{Channel, EncodedFrame, FramePayload};
use crate::capture::geometry::CaptureRegion;
use crate::capture::region::{crop_to_png_bytes, CropError, PixelRect};
use crate::capture::screenshot::{capture_primary_monitor, CaptureError, CapturedScreen};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use image::DynamicImage;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tauri::async_runtime::{self, JoinHandle};
use tauri::{AppHandle, Emitter};

const PREFIX_DATA_URI: &str = "data:image/png;base64,";

/// Turns the captured pixels inside `area` into PNG bytes for one channel.
pub trait FrameRenderer: Send + Sync + 'static {
    fn render(&self, screen: &DynamicImage, area: PixelRect) -> Result<Vec<u8>, RenderError>;
}

/// The capture preview: the capture area itself.
pub struct PreviewRenderer;

impl FrameRenderer for PreviewRenderer {
    fn render(&self, screen: &DynamicImage, area: PixelRect) -> Result<Vec<u8>, RenderError> {
        Ok(crop_to_png_bytes(screen, area)?)
    }
}

pub struct CaptureEngine {
    app: AppHandle,
    interval: Duration,
    area: Mutex<Option<CaptureRegion>>,
    required: Mutex<HashSet<Channel>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    renderers: HashMap<Channel, Box<dyn FrameRenderer>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CaptureEngine {
    /// Only the capture preview has a renderer; scope channels publish
    /// nothing until one is registered here.
    pub fn new(app: AppHandle, interval: Duration) -> Self {
        Self {
            app,
            interval,
            area: Mutex::new(None),
            required: Mutex::new(HashSet::new()),
            worker: Mutex::new(None),
            renderers: default_renderers(),
        }
    }

    /// `None` captures the whole primary monitor.
    pub fn set_capture_area(&self, area: Option<CaptureRegion>) {
        match &area {
            Some(region) => log::info!("[ENGINE] Capture area {}", region),
            None => log::info!("[ENGINE] Capture area reset to full screen"),
        }
        *lock(&self.area) = area;
    }

    pub fn set_required(self: &Arc<Self>, channel: Channel, required: bool) {
        let changed = {
            let mut set = lock(&self.required);
            if required {
                set.insert(channel)
            } else {
                set.remove(&channel)
            }
        };
        if changed {
            log::info!("[ENGINE] {} required: {}", channel, required);
            self.check_worker();
        }
    }

    /// Captures and renders a single frame for `channel`, outside the stream.
    pub async fn render_once(self: &Arc<Self>, channel: Channel) -> Result<EncodedFrame, RenderError> {
        if !self.renderers.contains_key(&channel) {
            return Err(RenderError::NoRenderer(channel));
        }
        let engine = Arc::clone(self);
        let mut frames = async_runtime::spawn_blocking(move || engine.render_blocking(&[channel]))
            .await
            .map_err(|e| RenderError::Worker(e.to_string()))??;
        frames
            .pop()
            .map(|(_, frame)| frame)
            .unwrap_or(Err(RenderError::NoRenderer(channel)))
    }

    /// Starts the worker when some channel is required, stops it when none is.
    fn check_worker(self: &Arc<Self>) {
        let wanted = !lock(&self.required).is_empty();
        let mut worker = lock(&self.worker);

        if wanted && worker.is_none() {
            log::info!("[ENGINE] Worker: start ({}ms interval)", self.interval.as_millis());
            let engine = Arc::clone(self);
            *worker = Some(async_runtime::spawn(async move { engine.stream_loop().await }));
        } else if !wanted {
            if let Some(handle) = worker.take() {
                log::info!("[ENGINE] Worker: stop");
                handle.abort();
            }
        }
    }

    async fn stream_loop(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let channels = renderable(&lock(&self.required), &self.renderers);
            if channels.is_empty() {
                continue;
            }

            let start = std::time::Instant::now();
            let engine = Arc::clone(&self);
            let frames = match async_runtime::spawn_blocking(move || engine.render_blocking(&channels)).await {
                Ok(Ok(frames)) => frames,
                Ok(Err(e)) => {
                    log::warn!("[ENGINE] Capture failed: {}", e);
                    continue;
                }
                Err(e) => {
                    log::warn!("[ENGINE] Capture task failed: {}", e);
                    continue;
                }
            };

            for (channel, frame) in frames {
                match frame {
                    Ok(frame) => self.publish(channel, frame),
                    Err(e) => log::warn!("[ENGINE] Rendering {} failed: {}", channel, e),
                }
            }
            log::debug!("[ENGINE] Tick took {}ms", start.elapsed().as_millis());
        }
    }

    fn publish(&self, channel: Channel, frame: EncodedFrame) {
        if let Err(e) = self.app.emit(channel.event_name(), FramePayload { frame }) {
            log::warn!("[ENGINE] Publishing {} failed: {}", channel, e);
        }
    }

    /// Blocking: one capture, rendered for each channel.
    fn render_blocking(
        &self,
        channels: &[Channel],
    ) -> Result<Vec<(Channel, Result<EncodedFrame, RenderError>)>, RenderError> {
        let screen = capture_primary_monitor()?;
        let area = self.pixel_area(&screen);

        Ok(channels
            .iter()
            .map(|&channel| {
                let frame = match self.renderers.get(&channel) {
                    Some(renderer) => renderer
                        .render(&screen.image, area)
                        .map(|png| EncodedFrame::new(format!("{}{}", PREFIX_DATA_URI, STANDARD_NO_PAD.encode(png)))),
                    None => Err(RenderError::NoRenderer(channel)),
                };
                (channel, frame)
            })
            .collect())
    }

    /// The capture area in screen pixels, clamped to the screen; the whole
    /// screen when no area is set or it lies entirely off-screen.
    fn pixel_area(&self, screen: &CapturedScreen) -> PixelRect {
        let full = PixelRect::full(&screen.image);
        let Some(region) = *lock(&self.area) else {
            return full;
        };
        let size = (screen.image.width(), screen.image.height());
        PixelRect::clamp_to(region.to_physical(screen.scale_factor), size).unwrap_or_else(|| {
            log::warn!("[ENGINE] Capture area {} is off-screen; using full screen", region);
            full
        })
    }
}

fn default_renderers() -> HashMap<Channel, Box<dyn FrameRenderer>> {
    let mut renderers: HashMap<Channel, Box<dyn FrameRenderer>> = HashMap::new();
    renderers.insert(Channel::CapturePreview, Box::new(PreviewRenderer));
    renderers
}

/// The required channels that can actually be rendered, in a stable order.
fn renderable(required: &HashSet<Channel>, renderers: &HashMap<Channel, Box<dyn FrameRenderer>>) -> Vec<Channel> {
    Channel::ALL
        .into_iter()
        .filter(|channel| required.contains(channel) && renderers.contains_key(channel))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error("No renderer registered for {0}")]
    NoRenderer(Channel),

    #[error("Capture worker failed: {0}")]
    Worker(String),
}
