//! Matching raw HID keyboard reports against a shortcut

use parking_lot::Mutex;
use tracing::trace;

use super::backend::HidReport;
use super::keys::ModifierState;
use crate::shortcut::keymap::{key_code_for_usage, KEYBOARD_USAGE_PAGE};
use crate::shortcut::{ModifierKey, Shortcut};

/// Per-registration report interpreter
#[derive(Debug)]
pub struct LowLevelMatcher {
    target: Shortcut,
    modifiers: Mutex<ModifierState>,
}

impl LowLevelMatcher {
    pub fn new(target: Shortcut) -> Self {
        Self {
            target,
            modifiers: Mutex::new(ModifierState::default()),
        }
    }

    pub fn modifier_state(&self) -> ModifierState {
        *self.modifiers.lock()
    }

    /// Feed one report; true when it completes the target combination
    ///
    /// The held modifiers must equal the target's flags exactly, so a
    /// superset (e.g. ⌘⇧ for a ⌘ target) does not match.
    pub fn handle(&self, report: HidReport) -> bool {
        if report.usage_page != KEYBOARD_USAGE_PAGE {
            return false;
        }
        let pressed = report.value != 0;
        let wanted = self.target.effective_modifiers();

        if let Some(key) = ModifierKey::from_usage(report.usage) {
            let held = {
                let mut state = self.modifiers.lock();
                if pressed {
                    state.press(key);
                } else {
                    state.release(key);
                }
                state.flags()
            };
            trace!(?key, pressed, ?held, "modifier report");
            return pressed && self.target.modifier_key() == Some(key) && held == wanted;
        }

        if !pressed || self.target.is_modifier_only() {
            return false;
        }
        let Some(key_code) = key_code_for_usage(report.usage) else {
            return false;
        };
        key_code == self.target.key_code && self.modifiers.lock().flags() == wanted
    }
}
