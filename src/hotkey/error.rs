//! Error types for hotkey channels

use thiserror::Error;

/// Failures of an individual hotkey channel
///
/// These never escape [`super::HotKeyChannel::register`]; they are logged and
/// reflected in the channel state.
#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("shortcut {0} cannot be expressed on this channel")]
    Unsupported(String),

    #[error("hotkey facility unavailable: {0}")]
    Unavailable(String),

    #[error("input monitoring permission not granted")]
    PermissionDenied,

    #[error("failed to register hotkey: {0}")]
    Registration(String),

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),
}
