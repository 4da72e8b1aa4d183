//! OS seams for the two hotkey channels

use std::sync::Arc;

use super::error::HotkeyError;
use crate::shortcut::Shortcut;

/// Zero-argument callback invoked when a shortcut fires
pub type HotKeyCallback = Arc<dyn Fn() + Send + Sync>;

/// Identifier handed out by a high-level backend
pub type HighLevelId = u32;

/// OS hotkey registration facility (blocked while secure input is on)
///
/// Lives on the thread that owns the application's event loop, so it is
/// not required to be `Send`.
pub trait HighLevelBackend {
    /// Install `shortcut`; `on_press` runs on every key-down
    fn register(&self, shortcut: Shortcut, on_press: HotKeyCallback)
        -> Result<HighLevelId, HotkeyError>;

    fn unregister(&self, id: HighLevelId);
}

/// Stand-in used when the OS hotkey facility could not be created
#[derive(Debug, Clone)]
pub struct UnavailableHighLevel {
    pub reason: String,
}

impl HighLevelBackend for UnavailableHighLevel {
    fn register(&self, _shortcut: Shortcut, _on_press: HotKeyCallback)
        -> Result<HighLevelId, HotkeyError> {
        Err(HotkeyError::Unavailable(self.reason.clone()))
    }

    fn unregister(&self, _id: HighLevelId) {}
}

/// One raw input value from an HID device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidReport {
    pub usage_page: u32,
    pub usage: u32,
    pub value: i64,
}

/// Receives reports, possibly on a thread the engine does not own
pub type HidSink = Arc<dyn Fn(HidReport) + Send + Sync>;

/// Raw HID keyboard access (works under secure input, needs Input Monitoring)
pub trait HidBackend: Send + Sync {
    /// Start delivering keyboard reports to `sink`
    ///
    /// May wait on a backend thread; async callers run it on the blocking
    /// pool.
    fn open(&self, sink: HidSink) -> Result<Box<dyn HidSubscription>, HotkeyError>;

    /// Live permission check
    fn check_access(&self) -> bool;
}

/// An open HID connection; closing it stops report delivery
pub trait HidSubscription: Send {
    fn close(self: Box<Self>);
}
