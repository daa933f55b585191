//! Runtime configuration.
//!
//! Read from the environment after loading an optional `.env` file.
//! Nothing is written back; bad values fall back to defaults with a warning.

use crate::bridge::Channel;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_LONG_PRESS_MS: u64 = 1000;
pub const DEFAULT_STREAM_INTERVAL_MS: u64 = 1000;

/// The four windows the app can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    CaptureArea,
    VectorScope,
    Waveform,
    CapturePreview,
}

impl WindowKind {
    pub const ALL: [WindowKind; 4] = [
        WindowKind::CaptureArea,
        WindowKind::VectorScope,
        WindowKind::Waveform,
        WindowKind::CapturePreview,
    ];

    /// Unique window label; also the tray menu id.
    pub fn label(&self) -> &'static str {
        match self {
            WindowKind::CaptureArea => "capture-area",
            WindowKind::VectorScope => "vector-scope",
            WindowKind::Waveform => "waveform",
            WindowKind::CapturePreview => "capture-preview",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }

    pub fn title(&self) -> &'static str {
        match self {
            WindowKind::CaptureArea => "Capture Area Setting",
            WindowKind::VectorScope => "Vector Scope",
            WindowKind::Waveform => "Waveform",
            WindowKind::CapturePreview => "Capture Preview",
        }
    }

    /// Frontend page, relative to the app's dist directory.
    pub fn page(&self) -> &'static str {
        match self {
            WindowKind::CaptureArea => "capture-area.html",
            _ => "monitor.html",
        }
    }

    /// Initial logical size.
    pub fn size(&self) -> (f64, f64) {
        match self {
            WindowKind::CaptureArea => (500.0, 500.0),
            WindowKind::VectorScope => (300.0, 320.0),
            WindowKind::Waveform => (500.0, 280.0),
            WindowKind::CapturePreview => (480.0, 320.0),
        }
    }

    /// The frame channel a monitor window shows; `None` for the picker.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            WindowKind::CaptureArea => None,
            WindowKind::VectorScope => Some(Channel::VectorScope),
            WindowKind::Waveform => Some(Channel::Waveform),
            WindowKind::CapturePreview => Some(Channel::CapturePreview),
        }
    }
}

fn default_hotkey(channel: Channel) -> &'static str {
    match channel {
        Channel::VectorScope => "CommandOrControl+Shift+R",
        Channel::Waveform => "CommandOrControl+Shift+V",
        Channel::CapturePreview => "CommandOrControl+Shift+P",
    }
}

fn hotkey_var(channel: Channel) -> &'static str {
    match channel {
        Channel::VectorScope => "SCOPE_HOTKEY_VECTOR_SCOPE",
        Channel::Waveform => "SCOPE_HOTKEY_WAVEFORM",
        Channel::CapturePreview => "SCOPE_HOTKEY_CAPTURE_PREVIEW",
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// How long a press must be held on the picker to reset the capture area.
    pub long_press: Duration,
    /// Period of the continuous capture worker.
    pub stream_interval: Duration,
    hotkeys: HashMap<Channel, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the `SCOPE_*` variables.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::info!("[CONFIG] Loaded {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("[CONFIG] Ignoring unreadable .env: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let long_press = duration_ms(&lookup, "SCOPE_LONG_PRESS_MS", DEFAULT_LONG_PRESS_MS);
        let stream_interval =
            duration_ms(&lookup, "SCOPE_STREAM_INTERVAL_MS", DEFAULT_STREAM_INTERVAL_MS);

        let hotkeys = Channel::ALL
            .into_iter()
            .map(|channel| {
                let accelerator = lookup(hotkey_var(channel))
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| default_hotkey(channel).to_string());
                (channel, accelerator)
            })
            .collect();

        Self {
            long_press,
            stream_interval,
            hotkeys,
        }
    }

    /// Accelerator for the manual-capture hot key of `channel`'s window.
    pub fn hotkey(&self, channel: Channel) -> &str {
        self.hotkeys
            .get(&channel)
            .map(String::as_str)
            .unwrap_or_else(|| default_hotkey(channel))
    }
}

fn duration_ms<F>(lookup: &F, key: &str, default_ms: u64) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Duration::from_millis(default_ms);
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Duration::from_millis(ms),
        _ => {
            log::warn!(
                "[CONFIG] {}={:?} is not a positive number of milliseconds, using {}",
                key,
                raw,
                default_ms
            );
            Duration::from_millis(default_ms)
        }
    }
}
