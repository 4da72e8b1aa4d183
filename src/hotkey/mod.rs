//! Global hotkey capture
//!
//! A shortcut is registered on the OS hotkey facility and, optionally, on
//! raw HID keyboard input so that it still fires while another app has
//! secure input enabled. Deliveries from both paths are debounced.

mod backend;
mod channel;
mod debounce;
mod error;
mod global;
mod keys;
mod low_level;

pub use backend::{
    HidBackend, HidReport, HidSink, HidSubscription, HighLevelBackend, HighLevelId, HotKeyCallback,
    UnavailableHighLevel,
};
pub use channel::{ChannelState, ChannelStatus, HotKeyChannel, HotKeyHandle, RetryPolicy};
pub use debounce::{Debouncer, COOLDOWN};
pub use error::HotkeyError;
pub use global::GlobalHotKeyBackend;
pub use keys::ModifierState;
pub use low_level::LowLevelMatcher;
