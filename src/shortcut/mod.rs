//! Shortcut targets and their durable/display encodings

mod codec;
pub mod keymap;

pub use codec::{decode, display_label, encode};
pub use keymap::{key_code, ModifierKey, Modifiers};

/// A key code plus modifier mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub key_code: u16,
    pub modifiers: Modifiers,
}

impl Shortcut {
    pub fn new(key_code: u16, modifiers: Modifiers) -> Self {
        Self {
            key_code,
            modifiers,
        }
    }

    /// The modifier key this shortcut consists of, if the key itself is one
    pub fn modifier_key(&self) -> Option<ModifierKey> {
        ModifierKey::from_key_code(self.key_code)
    }

    /// True when the trigger is a modifier key pressed alone
    pub fn is_modifier_only(&self) -> bool {
        self.modifier_key().is_some()
    }

    /// Flags that must be held when the shortcut fires
    ///
    /// A modifier-only target always includes its own flag, whether or not
    /// the stored mask carries it.
    pub fn effective_modifiers(&self) -> Modifiers {
        match self.modifier_key() {
            Some(key) => self.modifiers | key.flag(),
            None => self.modifiers,
        }
    }
}

impl std::fmt::Display for Shortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&display_label(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_only_includes_own_flag() {
        let s = Shortcut::new(key_code::RIGHT_OPTION, Modifiers::empty());
        assert!(s.is_modifier_only());
        assert_eq!(s.effective_modifiers(), Modifiers::OPTION);
    }

    #[test]
    fn test_regular_key() {
        let s = Shortcut::new(key_code::SPACE, Modifiers::COMMAND | Modifiers::SHIFT);
        assert!(!s.is_modifier_only());
        assert_eq!(s.effective_modifiers(), Modifiers::COMMAND | Modifiers::SHIFT);
    }
}
