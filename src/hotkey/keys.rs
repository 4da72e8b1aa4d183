//! Live modifier key state built from raw HID reports
//!
//! Tracks each of the eight physical modifier keys separately and collapses
//! them into the four logical flags when comparing against a target.

use crate::shortcut::{ModifierKey, Modifiers};

/// Which physical modifier keys are currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    pressed: u8,
}

impl ModifierState {
    fn bit(key: ModifierKey) -> u8 {
        1 << (key.usage() - 0xE0)
    }

    pub fn press(&mut self, key: ModifierKey) {
        self.pressed |= Self::bit(key);
    }

    pub fn release(&mut self, key: ModifierKey) {
        self.pressed &= !Self::bit(key);
    }

    pub fn is_pressed(&self, key: ModifierKey) -> bool {
        self.pressed & Self::bit(key) != 0
    }

    /// Check if all modifiers are released
    pub fn is_empty(&self) -> bool {
        self.pressed == 0
    }

    /// Logical flags, ignoring left/right
    pub fn flags(&self) -> Modifiers {
        ModifierKey::ALL
            .into_iter()
            .filter(|key| self.is_pressed(*key))
            .fold(Modifiers::empty(), |flags, key| flags | key.flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = ModifierState::default();
        assert!(state.is_empty());
        assert_eq!(state.flags(), Modifiers::empty());
    }

    #[test]
    fn test_left_and_right_collapse() {
        let mut state = ModifierState::default();
        state.press(ModifierKey::LeftCommand);
        state.press(ModifierKey::RightCommand);
        assert_eq!(state.flags(), Modifiers::COMMAND);

        state.release(ModifierKey::LeftCommand);
        assert_eq!(state.flags(), Modifiers::COMMAND);

        state.release(ModifierKey::RightCommand);
        assert!(state.is_empty());
    }

    #[test]
    fn test_combination() {
        let mut state = ModifierState::default();
        state.press(ModifierKey::LeftControl);
        state.press(ModifierKey::RightOption);
        assert_eq!(state.flags(), Modifiers::CONTROL | Modifiers::OPTION);
        assert!(state.is_pressed(ModifierKey::RightOption));
        assert!(!state.is_pressed(ModifierKey::LeftOption));
    }

    #[test]
    fn test_release_of_unpressed_key_is_harmless() {
        let mut state = ModifierState::default();
        state.release(ModifierKey::LeftShift);
        assert!(state.is_empty());
    }
}
