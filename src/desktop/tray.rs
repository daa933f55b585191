//! System tray: the app's only entry point.
//!
//! Left-click opens the capture-area picker; the menu opens any window.

use super::open_window;
use crate::config::WindowKind;
use tauri::{
    image::Image as TauriImage,
    menu::{MenuBuilder, MenuItemBuilder},
    tray::{MouseButton, TrayIconBuilder, TrayIconEvent},
    AppHandle,
};

pub fn setup_tray(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    let mut menu = MenuBuilder::new(app);
    for kind in WindowKind::ALL {
        let item = MenuItemBuilder::with_id(kind.label(), kind.title()).build(app)?;
        menu = menu.item(&item);
    }
    let quit_item = MenuItemBuilder::with_id("quit", "Quit Scope Monitor").build(app)?;
    let menu = menu.separator().item(&quit_item).build()?;

    // Decode the PNG icon to RGBA for Tauri's Image type
    let icon_bytes = include_bytes!("../../icons/32x32.png");
    let icon_img = image::load_from_memory(icon_bytes)
        .map_err(|e| format!("Failed to decode tray icon: {}", e))?;
    let rgba = icon_img.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let tray_icon = TauriImage::new_owned(rgba.into_raw(), w, h);

    let _tray = TrayIconBuilder::new()
        .icon(tray_icon)
        .tooltip("Scope Monitor")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray_icon, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                ..
            } = event
            {
                log::info!("[DESKTOP] Tray clicked, opening capture area picker");
                if let Err(e) = open_window(tray_icon.app_handle(), WindowKind::CaptureArea) {
                    log::error!("[DESKTOP] Failed to open picker: {}", e);
                }
            }
        })
        .on_menu_event(|app, event| {
            let id = event.id().as_ref();
            if id == "quit" {
                log::info!("[DESKTOP] Quit requested from tray menu");
                app.exit(0);
                return;
            }
            match WindowKind::from_label(id) {
                Some(kind) => {
                    if let Err(e) = open_window(app, kind) {
                        log::error!("[DESKTOP] Failed to open {}: {}", kind.label(), e);
                    }
                }
                None => log::warn!("[DESKTOP] Unknown tray menu item {}", id),
            }
        })
        .build(app)?;

    Ok(())
}
