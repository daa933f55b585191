//! Encoded frame → display resource, one live resource per window.
//!
//! `install` builds the new resource completely before releasing the old one,
//! and a frame that fails to decode leaves the current resource untouched.

use crate::bridge::EncodedFrame;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use std::fmt;
use std::sync::Arc;

const BASE64_MARKER: &str = ";base64,";

/// Accepts both padded and unpadded input; the producer emits no padding.
const FRAME_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Display-addressable name of stored image bytes (e.g. a `frame://` URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle(String);

impl ResourceHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where decoded bytes live while the surface references them.
pub trait ResourceStore: Send + Sync + 'static {
    fn create(&self, bytes: Vec<u8>, mime: &'static str) -> ResourceHandle;
    fn release(&self, handle: &ResourceHandle);
}

/// A decoded frame the surface can bind to. Owned by the manager, which
/// releases it exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct DisplayResource {
    handle: ResourceHandle,
    mime: &'static str,
    byte_len: usize,
}

impl DisplayResource {
    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }

    pub fn url(&self) -> &str {
        self.handle.as_str()
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

/// Decoded image bytes plus the sniffed MIME type.
#[derive(Debug)]
pub struct DecodedFrame {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// Strips an optional data-URI header, base64-decodes, and checks the bytes are an image.
pub fn decode_frame(frame: &EncodedFrame) -> Result<DecodedFrame, DecodeError> {
    let encoded = frame.as_str();
    let base64_part = match encoded.find(BASE64_MARKER) {
        Some(index) => &encoded[index + BASE64_MARKER.len()..],
        None => encoded,
    };
    let base64_part = base64_part.trim();
    if base64_part.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = FRAME_ENGINE.decode(base64_part)?;
    let format = image::guess_format(&bytes).map_err(|_| DecodeError::UnknownFormat)?;

    Ok(DecodedFrame {
        bytes,
        mime: format.to_mime_type(),
    })
}

pub struct FrameResourceManager<S: ResourceStore> {
    store: Arc<S>,
    current: Option<DisplayResource>,
    installed: u64,
    closed: bool,
}

impl<S: ResourceStore> FrameResourceManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            current: None,
            installed: 0,
            closed: false,
        }
    }

    /// Decodes `frame` into a new current resource, releasing the previous one last.
    ///
    /// On `Err` nothing changed: the previous resource is still current and live.
    pub fn install(&mut self, frame: &EncodedFrame) -> Result<&DisplayResource, FrameError> {
        if self.closed {
            return Err(FrameError::Closed);
        }

        let decoded = decode_frame(frame)?;
        let byte_len = decoded.bytes.len();
        let handle = self.store.create(decoded.bytes, decoded.mime);
        let resource = DisplayResource {
            handle,
            mime: decoded.mime,
            byte_len,
        };

        if let Some(previous) = self.current.replace(resource) {
            self.store.release(&previous.handle);
        }
        self.installed += 1;

        let current = self.current.as_ref().ok_or(FrameError::Closed)?;
        log::debug!(
            "[FRAME] Installed {} ({}, {} bytes)",
            current.handle,
            current.mime,
            current.byte_len
        );
        Ok(current)
    }

    pub fn current(&self) -> Option<&DisplayResource> {
        self.current.as_ref()
    }

    /// Number of frames successfully installed so far.
    pub fn installed(&self) -> u64 {
        self.installed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Terminal cleanup: releases the current resource. Further installs fail.
    pub fn close(&mut self) {
        if let Some(current) = self.current.take() {
            self.store.release(&current.handle);
        }
        self.closed = true;
    }
}

impl<S: ResourceStore> Drop for FrameResourceManager<S> {
    fn drop(&mut self) {
        if !self.closed {
            self.close();
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Frame payload is empty")]
    Empty,

    #[error("Frame payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Frame payload is not a recognised image format")]
    UnknownFormat,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Window is closed; frame dropped")]
    Closed,
}
