//! Build script for the Scope Monitor app.
//!
//! Tauri codegen only runs for the `desktop` feature. The headless
//! library build (monitor subsystem + tests) needs no build steps.

fn main() {
    #[cfg(feature = "desktop")]
    tauri_build::build();
}
