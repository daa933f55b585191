//! Global hot keys through `tauri-plugin-global-shortcut`.
//!
//! One registrar per monitor window: a press is queued on that window. A
//! reopened window takes the shortcut over from its closing predecessor, and
//! the predecessor's later unregister leaves it alone.

use crate::events::{WeakWindowSender, WindowSender};
use crate::monitor::manual::{HotkeyError, HotkeyRegistrar};
use crate::monitor::window::MonitorEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tauri::AppHandle;
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

/// Which registrar currently holds each accelerator.
#[derive(Debug, Default)]
pub struct ShortcutOwners {
    next_id: AtomicU64,
    owners: Mutex<HashMap<String, u64>>,
}

impl ShortcutOwners {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Records `owner` as the holder of `accelerator`. Returns the previous holder.
    fn claim(&self, accelerator: &str, owner: u64) -> Option<u64> {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(accelerator.to_string(), owner)
            .filter(|&previous| previous != owner)
    }

    /// Forgets `accelerator` if `owner` still holds it. Returns whether it did.
    fn release(&self, accelerator: &str, owner: u64) -> bool {
        let mut owners = self.owners.lock().unwrap_or_else(PoisonError::into_inner);
        if owners.get(accelerator) == Some(&owner) {
            owners.remove(accelerator);
            true
        } else {
            false
        }
    }
}

pub struct TauriHotkeys {
    app: AppHandle,
    sender: WeakWindowSender<MonitorEvent>,
    owners: Arc<ShortcutOwners>,
    id: u64,
}

impl TauriHotkeys {
    pub fn new(app: AppHandle, sender: &WindowSender<MonitorEvent>, owners: Arc<ShortcutOwners>) -> Self {
        let id = owners.next_id();
        Self {
            app,
            sender: sender.downgrade(),
            owners,
            id,
        }
    }
}

impl HotkeyRegistrar for TauriHotkeys {
    fn register(&self, accelerator: &str) -> Result<(), HotkeyError> {
        let shortcut = parse(accelerator)?;
        let shortcuts = self.app.global_shortcut();

        if shortcuts.is_registered(shortcut) {
            log::debug!("[MANUAL] {} still held by a closing window; taking it over", accelerator);
            shortcuts
                .unregister(shortcut)
                .map_err(|e| registration_error(accelerator, e))?;
        }

        let sender = self.sender.clone();
        let name = accelerator.to_string();
        shortcuts
            .on_shortcut(shortcut, move |_app, _shortcut, event| {
                if event.state == ShortcutState::Pressed {
                    log::debug!("[MANUAL] {} pressed", name);
                    sender.send(MonitorEvent::HotkeyPressed);
                }
            })
            .map_err(|e| registration_error(accelerator, e))?;

        if let Some(previous) = self.owners.claim(accelerator, self.id) {
            log::debug!("[MANUAL] {} moved from registrar {} to {}", accelerator, previous, self.id);
        }
        Ok(())
    }

    fn unregister(&self, accelerator: &str) -> Result<(), HotkeyError> {
        if !self.owners.release(accelerator, self.id) {
            log::debug!("[MANUAL] {} now belongs to another window; leaving it", accelerator);
            return Ok(());
        }
        let shortcut = parse(accelerator)?;
        self.app
            .global_shortcut()
            .unregister(shortcut)
            .map_err(|e| registration_error(accelerator, e))
    }
}

fn parse(accelerator: &str) -> Result<Shortcut, HotkeyError> {
    accelerator
        .parse::<Shortcut>()
        .map_err(|_| HotkeyError::Invalid(accelerator.to_string()))
}

fn registration_error(accelerator: &str, e: tauri_plugin_global_shortcut::Error) -> HotkeyError {
    HotkeyError::Registration {
        accelerator: accelerator.to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "CommandOrControl+Shift+V";

    #[test]
    fn closing_window_does_not_release_a_taken_over_shortcut() {
        let owners = ShortcutOwners::default();
        let old = owners.next_id();
        let new = owners.next_id();

        assert_eq!(owners.claim(KEY, old), None);
        assert_eq!(owners.claim(KEY, new), Some(old));

        assert!(!owners.release(KEY, old), "stale owner must not unregister");
        assert!(owners.release(KEY, new));
        assert!(!owners.release(KEY, new));
    }

    #[test]
    fn reclaiming_by_the_same_owner_is_not_a_takeover() {
        let owners = ShortcutOwners::default();
        let id = owners.next_id();
        owners.claim(KEY, id);
        assert_eq!(owners.claim(KEY, id), None);
    }
}
