//! Desktop shell: Tauri windows, tray, global hot keys and the capture engine.
//!
//! Each window gets its own event queue and a task draining it. Webview
//! gestures arrive through the `window_gesture` command and are routed to
//! that queue by window label.

mod bridge;
mod engine;
mod hotkeys;
mod protocol;
mod surface;
mod tray;

use crate::capture::picker::{CaptureAreaPicker, PickerEvent};
use crate::config::{AppConfig, WindowKind};
use crate::events::{window_queue, WindowSender};
use crate::monitor::store::{FrameStore, FRAME_SCHEME};
use crate::monitor::window::{MonitorEvent, MonitorParts, MonitorWindow};
use bridge::TauriBridge;
use engine::CaptureEngine;
use hotkeys::{ShortcutOwners, TauriHotkeys};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use surface::{WebviewMonitorSurface, WebviewPickerSurface};
use tauri::{async_runtime, AppHandle, Manager, RunEvent, WebviewUrl, WebviewWindowBuilder, WindowEvent};

pub struct DesktopState {
    config: AppConfig,
    bridge: Arc<TauriBridge>,
    store: Arc<FrameStore>,
    shortcuts: Arc<ShortcutOwners>,
    registry: WindowRegistry,
}

enum WindowRoute {
    Picker(WindowSender<PickerEvent>),
    Monitor(WindowSender<MonitorEvent>),
}

/// Open windows by label. The routes hold each window's only strong
/// sender, so removing a route lets that window's loop finish.
#[derive(Default)]
struct WindowRegistry {
    routes: Mutex<HashMap<String, WindowRoute>>,
}

impl WindowRegistry {
    fn insert(&self, label: &str, route: WindowRoute) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(label.to_string(), route);
    }

    /// Queues `gesture` on the window's loop. Returns `false` for unknown windows.
    fn dispatch(&self, label: &str, gesture: Gesture) -> bool {
        let routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        match routes.get(label) {
            Some(WindowRoute::Picker(sender)) => {
                if let Some(event) = picker_event(gesture) {
                    sender.send(event);
                }
                true
            }
            Some(WindowRoute::Monitor(sender)) => {
                if let Some(event) = monitor_event(gesture) {
                    sender.send(event);
                }
                true
            }
            None => false,
        }
    }

    fn close(&self, label: &str) {
        let route = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(label);
        match route {
            Some(WindowRoute::Picker(sender)) => {
                sender.send(PickerEvent::CloseRequested);
            }
            Some(WindowRoute::Monitor(sender)) => {
                sender.send(MonitorEvent::CloseRequested);
            }
            None => {}
        }
    }
}

/// Pointer gestures reported by the webview pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Gesture {
    Ready,
    Click,
    DoubleClick,
    PressDown,
    PressUp,
}

fn picker_event(gesture: Gesture) -> Option<PickerEvent> {
    match gesture {
        Gesture::Ready => Some(PickerEvent::Opened),
        Gesture::DoubleClick => Some(PickerEvent::DoubleClick),
        Gesture::PressDown => Some(PickerEvent::PressDown),
        Gesture::PressUp => Some(PickerEvent::PressUp),
        Gesture::Click => None,
    }
}

fn monitor_event(gesture: Gesture) -> Option<MonitorEvent> {
    match gesture {
        Gesture::Ready => Some(MonitorEvent::Opened),
        Gesture::Click => Some(MonitorEvent::Click),
        Gesture::DoubleClick => Some(MonitorEvent::DoubleClick),
        Gesture::PressDown | Gesture::PressUp => None,
    }
}

/// Focuses `kind`'s window if it is open, otherwise creates it and starts its loop.
pub(crate) fn open_window(app: &AppHandle, kind: WindowKind) -> tauri::Result<()> {
    if let Some(window) = app.get_webview_window(kind.label()) {
        log::debug!("[DESKTOP] {} already open; focusing", kind.label());
        return window.set_focus();
    }

    let state = app.state::<DesktopState>();
    let (width, height) = kind.size();
    let window = WebviewWindowBuilder::new(app, kind.label(), WebviewUrl::App(kind.page().into()))
        .title(kind.title())
        .inner_size(width, height)
        .always_on_top(true)
        .content_protected(true)
        .build()?;

    match kind.channel() {
        None => {
            let (sender, events) = window_queue();
            let picker = CaptureAreaPicker::new(
                Arc::clone(&state.bridge),
                Arc::new(WebviewPickerSurface::new(window)),
                &sender,
                state.config.long_press,
            );
            state.registry.insert(kind.label(), WindowRoute::Picker(sender));
            async_runtime::spawn(picker.run(events));
        }
        Some(channel) => {
            let (sender, events) = window_queue();
            let parts = MonitorParts {
                channel,
                accelerator: state.config.hotkey(channel).to_string(),
                bridge: Arc::clone(&state.bridge),
                hotkeys: Arc::new(TauriHotkeys::new(app.clone(), &sender, Arc::clone(&state.shortcuts))),
                surface: Arc::new(WebviewMonitorSurface::new(app.clone(), kind.label())),
                store: Arc::clone(&state.store),
            };
            let monitor = MonitorWindow::new(parts, &sender);
            state.registry.insert(kind.label(), WindowRoute::Monitor(sender));
            async_runtime::spawn(monitor.run(events));
        }
    }

    log::info!("[DESKTOP] Opened {}", kind.label());
    Ok(())
}

/// Tauri command: a pointer gesture on the calling window.
#[tauri::command]
fn window_gesture(
    window: tauri::WebviewWindow,
    state: tauri::State<'_, DesktopState>,
    gesture: Gesture,
) -> Result<(), String> {
    if state.registry.dispatch(window.label(), gesture) {
        Ok(())
    } else {
        Err(format!("No window loop for {}", window.label()))
    }
}

/// Tauri command: forwards a frontend diagnostic to the log.
#[tauri::command]
fn print_log(text: String) {
    log::info!("[UI] {}", text);
}

/// Entry point, called by the Tauri runtime.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::init();

    let config = AppConfig::from_env();
    let store = Arc::new(FrameStore::new());
    let protocol_store = Arc::clone(&store);

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .register_uri_scheme_protocol(FRAME_SCHEME, move |_ctx, request| {
            protocol::respond(&protocol_store, &request)
        })
        .invoke_handler(tauri::generate_handler![window_gesture, print_log])
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                if let Some(state) = window.try_state::<DesktopState>() {
                    state.registry.close(window.label());
                }
            }
        })
        .setup(move |app| {
            log::info!("[DESKTOP] Scope Monitor starting up");

            let engine = Arc::new(CaptureEngine::new(app.handle().clone(), config.stream_interval));
            let bridge = Arc::new(TauriBridge::new(app.handle().clone(), engine));
            app.manage(DesktopState {
                config: config.clone(),
                bridge,
                store: Arc::clone(&store),
                shortcuts: Arc::new(ShortcutOwners::default()),
                registry: WindowRegistry::default(),
            });

            tray::setup_tray(app.handle())?;

            log::info!("[DESKTOP] System tray initialized");
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("Error building Scope Monitor");

    app.run(|_app, event| {
        // Closing the last window keeps the tray alive; only Quit exits.
        if let RunEvent::ExitRequested { code: None, api, .. } = event {
            api.prevent_exit();
        }
    });
}
