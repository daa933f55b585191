//! Monitor windows (vector scope, waveform, capture preview).
//!
//! Each window owns one stream controller, one manual-capture trigger and one
//! frame manager. Only the frame store behind the managers is process-wide.

pub mod frame;
pub mod manual;
pub mod store;
pub mod stream;
pub mod window;

pub use frame::{DisplayResource, FrameResourceManager, ResourceHandle, ResourceStore};
pub use manual::{HotkeyError, HotkeyRegistrar, ManualCaptureTrigger};
pub use store::FrameStore;
pub use stream::{StreamSubscriptionController, SubscriptionState};
pub use window::{Flow, MonitorEvent, MonitorParts, MonitorWindow};
