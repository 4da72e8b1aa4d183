//! OS backends for pointer state, the drag pasteboard and HID keyboards
//!
//! macOS gets real implementations. Elsewhere the backends are inert: the
//! pointer never presses, the pasteboard never changes and HID access is
//! reported unavailable, so the engine idles instead of failing.

use std::sync::Arc;

use crate::drag::{DragPasteboard, PointerSource};
use crate::hotkey::HidBackend;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(not(target_os = "macos"))]
mod inert;

#[cfg(target_os = "macos")]
pub fn pointer_source() -> Arc<dyn PointerSource> {
    Arc::new(macos::SystemPointer)
}

#[cfg(target_os = "macos")]
pub fn drag_pasteboard() -> Arc<dyn DragPasteboard> {
    Arc::new(macos::SystemDragPasteboard)
}

#[cfg(target_os = "macos")]
pub fn hid_backend() -> Arc<dyn HidBackend> {
    Arc::new(macos::IoHidKeyboard)
}

/// Drain pending main-thread events (OS hotkey presses arrive this way)
#[cfg(target_os = "macos")]
pub fn pump_event_loop() {
    macos::pump_main_run_loop();
}

#[cfg(not(target_os = "macos"))]
pub fn pointer_source() -> Arc<dyn PointerSource> {
    Arc::new(inert::NoPointer)
}

#[cfg(not(target_os = "macos"))]
pub fn drag_pasteboard() -> Arc<dyn DragPasteboard> {
    Arc::new(inert::EmptyPasteboard)
}

#[cfg(not(target_os = "macos"))]
pub fn hid_backend() -> Arc<dyn HidBackend> {
    Arc::new(inert::UnavailableHid)
}

#[cfg(not(target_os = "macos"))]
pub fn pump_event_loop() {}
