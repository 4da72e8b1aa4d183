//! shelf-input: global input detection for a drag-and-drop shelf
//!
//! - [`drag::DragMonitor`] polls the pointer and drag pasteboard, tracks
//!   drag sessions and recognizes the "jiggle" reveal gesture
//! - [`hotkey::HotKeyChannel`] registers a global shortcut on two channels
//!   so it keeps firing while secure input is active
//! - [`shortcut`] encodes shortcuts for storage and display
//! - [`permissions::PermissionCache`] remembers granted OS capabilities

pub mod config;
pub mod drag;
pub mod events;
pub mod geometry;
pub mod hotkey;
pub mod permissions;
pub mod platform;
pub mod shortcut;
pub mod store;
pub mod task;
