//! In-memory [`ResourceStore`]: decoded frames addressed by `frame://` URLs.
//!
//! The desktop shell serves these bytes through a custom URI scheme, so a
//! handle here plays the role an object URL plays in a browser.

use super::frame::{ResourceHandle, ResourceStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub const FRAME_SCHEME: &str = "frame";

/// URL a webview uses to load frame `id`. Windows and Android webviews only
/// reach custom schemes through the `http://<scheme>.localhost` form.
pub fn frame_url(id: u64) -> String {
    if cfg!(any(windows, target_os = "android")) {
        format!("http://{}.localhost/{}", FRAME_SCHEME, id)
    } else {
        format!("{}://localhost/{}", FRAME_SCHEME, id)
    }
}

/// Extracts the frame id from a URL or request path (`/42`, `frame://localhost/42`).
pub fn frame_id(url_or_path: &str) -> Option<u64> {
    url_or_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

#[derive(Debug, Clone)]
pub struct StoredFrame {
    pub bytes: Arc<[u8]>,
    pub mime: &'static str,
}

#[derive(Debug, Default)]
pub struct FrameStore {
    next_id: AtomicU64,
    frames: Mutex<HashMap<u64, StoredFrame>>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u64) -> Option<StoredFrame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Frames created and not yet released, across all windows.
    pub fn live_count(&self) -> usize {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl ResourceStore for FrameStore {
    fn create(&self, bytes: Vec<u8>, mime: &'static str) -> ResourceHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let frame = StoredFrame {
            bytes: Arc::from(bytes),
            mime,
        };
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, frame);
        ResourceHandle::new(frame_url(id))
    }

    fn release(&self, handle: &ResourceHandle) {
        let Some(id) = frame_id(handle.as_str()) else {
            log::warn!("[FRAME] Release of foreign handle {}", handle);
            return;
        };
        let removed = self
            .frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_none() {
            log::warn!("[FRAME] {} released twice or never stored", handle);
        }
    }
}
