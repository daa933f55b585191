//! Scope Monitor: display surfaces of a screen-analysis tool.
//!
//! Three kinds of window, each with its own state:
//! - Capture-area picker (capture/picker.rs): turns its own screen
//!   rectangle into the capture area
//! - Monitor windows (monitor/): vector scope, waveform and capture
//!   preview, fed by a live frame stream or a hot-key one-shot capture
//! - Desktop shell (desktop/, feature `desktop`): Tauri windows, tray,
//!   global hot keys and the in-process capture engine
//!
//! Frames are produced on the far side of the [`bridge::Bridge`]; this crate
//! only decides when to ask for them and keeps exactly one decoded frame
//! alive per window.

pub mod bridge;
pub mod capture;
pub mod config;
pub mod events;
pub mod monitor;
pub mod surface;
pub mod timer;

#[cfg(feature = "desktop")]
mod desktop;

#[cfg(feature = "desktop")]
pub use desktop::run;
