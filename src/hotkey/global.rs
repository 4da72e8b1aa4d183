//! High-level channel backed by the `global-hotkey` crate

use std::collections::HashMap;
use std::sync::Arc;

use global_hotkey::hotkey::{Code, HotKey, Modifiers as HotKeyModifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::backend::{HighLevelBackend, HighLevelId, HotKeyCallback};
use super::error::HotkeyError;
use crate::shortcut::{Modifiers, Shortcut};

type CallbackTable = Arc<Mutex<HashMap<HighLevelId, (HotKey, HotKeyCallback)>>>;

/// OS hotkey registration
///
/// Must be created on the main thread. Press events are delivered through
/// the platform event loop, which the host has to keep running.
pub struct GlobalHotKeyBackend {
    manager: GlobalHotKeyManager,
    callbacks: CallbackTable,
}

impl GlobalHotKeyBackend {
    pub fn new() -> Result<Self, HotkeyError> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| HotkeyError::Unavailable(e.to_string()))?;
        let callbacks: CallbackTable = Arc::new(Mutex::new(HashMap::new()));

        let table = Arc::clone(&callbacks);
        GlobalHotKeyEvent::set_event_handler(Some(move |event: GlobalHotKeyEvent| {
            if !matches!(event.state, HotKeyState::Pressed) {
                return;
            }
            let callback = table.lock().get(&event.id).map(|(_, cb)| Arc::clone(cb));
            match callback {
                Some(callback) => callback(),
                None => debug!(id = event.id, "press for unknown hotkey id"),
            }
        }));

        Ok(Self { manager, callbacks })
    }
}

impl HighLevelBackend for GlobalHotKeyBackend {
    fn register(
        &self,
        shortcut: Shortcut,
        on_press: HotKeyCallback,
    ) -> Result<HighLevelId, HotkeyError> {
        let code = code_for_key(shortcut.key_code)
            .ok_or_else(|| HotkeyError::Unsupported(shortcut.to_string()))?;
        let mods = to_hotkey_modifiers(shortcut.modifiers);
        let hotkey = HotKey::new((!mods.is_empty()).then_some(mods), code);
        let id = hotkey.id();

        self.manager.register(hotkey).map_err(|e| match e {
            global_hotkey::Error::AlreadyRegistered(_) => {
                HotkeyError::Registration(format!("{shortcut} is already registered"))
            }
            other => HotkeyError::Registration(other.to_string()),
        })?;

        self.callbacks.lock().insert(id, (hotkey, on_press));
        debug!(%shortcut, id, "registered with OS hotkey facility");
        Ok(id)
    }

    fn unregister(&self, id: HighLevelId) {
        let Some((hotkey, _)) = self.callbacks.lock().remove(&id) else {
            return;
        };
        if let Err(e) = self.manager.unregister(hotkey) {
            warn!(id, error = %e, "failed to unregister OS hotkey");
        }
    }
}

impl Drop for GlobalHotKeyBackend {
    fn drop(&mut self) {
        GlobalHotKeyEvent::set_event_handler(None::<fn(GlobalHotKeyEvent)>);
        let hotkeys: Vec<HotKey> = self
            .callbacks
            .lock()
            .drain()
            .map(|(_, (hotkey, _))| hotkey)
            .collect();
        if let Err(e) = self.manager.unregister_all(&hotkeys) {
            warn!(error = %e, "failed to release OS hotkeys");
        }
    }
}

fn to_hotkey_modifiers(modifiers: Modifiers) -> HotKeyModifiers {
    let mut out = HotKeyModifiers::empty();
    if modifiers.contains(Modifiers::SHIFT) {
        out |= HotKeyModifiers::SHIFT;
    }
    if modifiers.contains(Modifiers::CONTROL) {
        out |= HotKeyModifiers::CONTROL;
    }
    if modifiers.contains(Modifiers::OPTION) {
        out |= HotKeyModifiers::ALT;
    }
    if modifiers.contains(Modifiers::COMMAND) {
        out |= HotKeyModifiers::SUPER;
    }
    out
}

/// Map a virtual key code onto the crate's physical key codes
fn code_for_key(key_code: u16) -> Option<Code> {
    let code = match key_code {
        0x00 => Code::KeyA,
        0x0B => Code::KeyB,
        0x08 => Code::KeyC,
        0x02 => Code::KeyD,
        0x0E => Code::KeyE,
        0x03 => Code::KeyF,
        0x05 => Code::KeyG,
        0x04 => Code::KeyH,
        0x22 => Code::KeyI,
        0x26 => Code::KeyJ,
        0x28 => Code::KeyK,
        0x25 => Code::KeyL,
        0x2E => Code::KeyM,
        0x2D => Code::KeyN,
        0x1F => Code::KeyO,
        0x23 => Code::KeyP,
        0x0C => Code::KeyQ,
        0x0F => Code::KeyR,
        0x01 => Code::KeyS,
        0x11 => Code::KeyT,
        0x20 => Code::KeyU,
        0x09 => Code::KeyV,
        0x0D => Code::KeyW,
        0x07 => Code::KeyX,
        0x10 => Code::KeyY,
        0x06 => Code::KeyZ,
        0x12 => Code::Digit1,
        0x13 => Code::Digit2,
        0x14 => Code::Digit3,
        0x15 => Code::Digit4,
        0x17 => Code::Digit5,
        0x16 => Code::Digit6,
        0x1A => Code::Digit7,
        0x1C => Code::Digit8,
        0x19 => Code::Digit9,
        0x1D => Code::Digit0,
        0x24 => Code::Enter,
        0x35 => Code::Escape,
        0x33 => Code::Backspace,
        0x30 => Code::Tab,
        0x31 => Code::Space,
        0x1B => Code::Minus,
        0x18 => Code::Equal,
        0x21 => Code::BracketLeft,
        0x1E => Code::BracketRight,
        0x2A => Code::Backslash,
        0x29 => Code::Semicolon,
        0x27 => Code::Quote,
        0x32 => Code::Backquote,
        0x2B => Code::Comma,
        0x2F => Code::Period,
        0x2C => Code::Slash,
        0x7A => Code::F1,
        0x78 => Code::F2,
        0x63 => Code::F3,
        0x76 => Code::F4,
        0x60 => Code::F5,
        0x61 => Code::F6,
        0x62 => Code::F7,
        0x64 => Code::F8,
        0x65 => Code::F9,
        0x6D => Code::F10,
        0x67 => Code::F11,
        0x6F => Code::F12,
        0x73 => Code::Home,
        0x74 => Code::PageUp,
        0x75 => Code::Delete,
        0x77 => Code::End,
        0x79 => Code::PageDown,
        0x7C => Code::ArrowRight,
        0x7B => Code::ArrowLeft,
        0x7D => Code::ArrowDown,
        0x7E => Code::ArrowUp,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::key_code;

    #[test]
    fn test_modifier_translation() {
        let mods = to_hotkey_modifiers(Modifiers::COMMAND | Modifiers::OPTION);
        assert_eq!(mods, HotKeyModifiers::SUPER | HotKeyModifiers::ALT);
        assert!(to_hotkey_modifiers(Modifiers::empty()).is_empty());
    }

    #[test]
    fn test_code_mapping() {
        assert_eq!(code_for_key(key_code::ANSI_K), Some(Code::KeyK));
        assert_eq!(code_for_key(key_code::SPACE), Some(Code::Space));
        assert_eq!(code_for_key(key_code::ESCAPE), Some(Code::Escape));
    }

    #[test]
    fn test_modifier_keys_have_no_code() {
        assert_eq!(code_for_key(key_code::RIGHT_OPTION), None);
        assert_eq!(code_for_key(key_code::COMMAND), None);
    }
}
