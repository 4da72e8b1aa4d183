//! Key code tables
//!
//! Virtual key codes follow the macOS `kVK_*` layout. The same table maps
//! HID keyboard usages (usage page 0x07) onto virtual key codes, so raw
//! reports from the low-level channel can be compared against a stored
//! shortcut.

use bitflags::bitflags;

bitflags! {
    /// Logical modifier flags, bit-compatible with macOS event flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u64 {
        const SHIFT = 1 << 17;
        const CONTROL = 1 << 18;
        const OPTION = 1 << 19;
        const COMMAND = 1 << 20;
    }
}

/// Virtual key codes referenced by name elsewhere in the crate
pub mod key_code {
    pub const SPACE: u16 = 0x31;
    pub const ESCAPE: u16 = 0x35;
    pub const RIGHT_COMMAND: u16 = 0x36;
    pub const COMMAND: u16 = 0x37;
    pub const SHIFT: u16 = 0x38;
    pub const OPTION: u16 = 0x3A;
    pub const CONTROL: u16 = 0x3B;
    pub const RIGHT_SHIFT: u16 = 0x3C;
    pub const RIGHT_OPTION: u16 = 0x3D;
    pub const RIGHT_CONTROL: u16 = 0x3E;
    pub const ANSI_A: u16 = 0x00;
    pub const ANSI_D: u16 = 0x02;
    pub const ANSI_K: u16 = 0x28;
    pub const ANSI_V: u16 = 0x09;
}

/// HID usage page for keyboards
pub const KEYBOARD_USAGE_PAGE: u32 = 0x07;

/// One of the eight physical modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    LeftControl,
    LeftShift,
    LeftOption,
    LeftCommand,
    RightControl,
    RightShift,
    RightOption,
    RightCommand,
}

impl ModifierKey {
    pub const ALL: [ModifierKey; 8] = [
        ModifierKey::LeftControl,
        ModifierKey::LeftShift,
        ModifierKey::LeftOption,
        ModifierKey::LeftCommand,
        ModifierKey::RightControl,
        ModifierKey::RightShift,
        ModifierKey::RightOption,
        ModifierKey::RightCommand,
    ];

    /// HID usage on the keyboard page (0xE0..=0xE7)
    pub fn usage(self) -> u32 {
        match self {
            ModifierKey::LeftControl => 0xE0,
            ModifierKey::LeftShift => 0xE1,
            ModifierKey::LeftOption => 0xE2,
            ModifierKey::LeftCommand => 0xE3,
            ModifierKey::RightControl => 0xE4,
            ModifierKey::RightShift => 0xE5,
            ModifierKey::RightOption => 0xE6,
            ModifierKey::RightCommand => 0xE7,
        }
    }

    pub fn key_code(self) -> u16 {
        match self {
            ModifierKey::LeftControl => key_code::CONTROL,
            ModifierKey::LeftShift => key_code::SHIFT,
            ModifierKey::LeftOption => key_code::OPTION,
            ModifierKey::LeftCommand => key_code::COMMAND,
            ModifierKey::RightControl => key_code::RIGHT_CONTROL,
            ModifierKey::RightShift => key_code::RIGHT_SHIFT,
            ModifierKey::RightOption => key_code::RIGHT_OPTION,
            ModifierKey::RightCommand => key_code::RIGHT_COMMAND,
        }
    }

    /// Logical flag, ignoring the left/right distinction
    pub fn flag(self) -> Modifiers {
        match self {
            ModifierKey::LeftControl | ModifierKey::RightControl => Modifiers::CONTROL,
            ModifierKey::LeftShift | ModifierKey::RightShift => Modifiers::SHIFT,
            ModifierKey::LeftOption | ModifierKey::RightOption => Modifiers::OPTION,
            ModifierKey::LeftCommand | ModifierKey::RightCommand => Modifiers::COMMAND,
        }
    }

    pub fn is_right(self) -> bool {
        matches!(
            self,
            ModifierKey::RightControl
                | ModifierKey::RightShift
                | ModifierKey::RightOption
                | ModifierKey::RightCommand
        )
    }

    pub fn from_usage(usage: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.usage() == usage)
    }

    pub fn from_key_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key_code() == code)
    }
}

struct KeyEntry {
    key_code: u16,
    hid_usage: u32,
    glyph: &'static str,
}

const fn key(key_code: u16, hid_usage: u32, glyph: &'static str) -> KeyEntry {
    KeyEntry {
        key_code,
        hid_usage,
        glyph,
    }
}

static KEYS: &[KeyEntry] = &[
    key(0x00, 0x04, "A"),
    key(0x0B, 0x05, "B"),
    key(0x08, 0x06, "C"),
    key(0x02, 0x07, "D"),
    key(0x0E, 0x08, "E"),
    key(0x03, 0x09, "F"),
    key(0x05, 0x0A, "G"),
    key(0x04, 0x0B, "H"),
    key(0x22, 0x0C, "I"),
    key(0x26, 0x0D, "J"),
    key(0x28, 0x0E, "K"),
    key(0x25, 0x0F, "L"),
    key(0x2E, 0x10, "M"),
    key(0x2D, 0x11, "N"),
    key(0x1F, 0x12, "O"),
    key(0x23, 0x13, "P"),
    key(0x0C, 0x14, "Q"),
    key(0x0F, 0x15, "R"),
    key(0x01, 0x16, "S"),
    key(0x11, 0x17, "T"),
    key(0x20, 0x18, "U"),
    key(0x09, 0x19, "V"),
    key(0x0D, 0x1A, "W"),
    key(0x07, 0x1B, "X"),
    key(0x10, 0x1C, "Y"),
    key(0x06, 0x1D, "Z"),
    key(0x12, 0x1E, "1"),
    key(0x13, 0x1F, "2"),
    key(0x14, 0x20, "3"),
    key(0x15, 0x21, "4"),
    key(0x17, 0x22, "5"),
    key(0x16, 0x23, "6"),
    key(0x1A, 0x24, "7"),
    key(0x1C, 0x25, "8"),
    key(0x19, 0x26, "9"),
    key(0x1D, 0x27, "0"),
    key(0x24, 0x28, "↩"),
    key(0x35, 0x29, "⎋"),
    key(0x33, 0x2A, "⌫"),
    key(0x30, 0x2B, "⇥"),
    key(0x31, 0x2C, "Space"),
    key(0x1B, 0x2D, "-"),
    key(0x18, 0x2E, "="),
    key(0x21, 0x2F, "["),
    key(0x1E, 0x30, "]"),
    key(0x2A, 0x31, "\\"),
    key(0x29, 0x33, ";"),
    key(0x27, 0x34, "'"),
    key(0x32, 0x35, "`"),
    key(0x2B, 0x36, ","),
    key(0x2F, 0x37, "."),
    key(0x2C, 0x38, "/"),
    key(0x39, 0x39, "⇪"),
    key(0x7A, 0x3A, "F1"),
    key(0x78, 0x3B, "F2"),
    key(0x63, 0x3C, "F3"),
    key(0x76, 0x3D, "F4"),
    key(0x60, 0x3E, "F5"),
    key(0x61, 0x3F, "F6"),
    key(0x62, 0x40, "F7"),
    key(0x64, 0x41, "F8"),
    key(0x65, 0x42, "F9"),
    key(0x6D, 0x43, "F10"),
    key(0x67, 0x44, "F11"),
    key(0x6F, 0x45, "F12"),
    key(0x73, 0x4A, "↖"),
    key(0x74, 0x4B, "⇞"),
    key(0x75, 0x4C, "⌦"),
    key(0x77, 0x4D, "↘"),
    key(0x79, 0x4E, "⇟"),
    key(0x7C, 0x4F, "→"),
    key(0x7B, 0x50, "←"),
    key(0x7D, 0x51, "↓"),
    key(0x7E, 0x52, "↑"),
];

/// Display glyph for a non-modifier key code
pub fn glyph(key_code: u16) -> Option<&'static str> {
    KEYS.iter().find(|k| k.key_code == key_code).map(|k| k.glyph)
}

/// Virtual key code for a non-modifier HID keyboard usage
pub fn key_code_for_usage(usage: u32) -> Option<u16> {
    KEYS.iter().find(|k| k.hid_usage == usage).map(|k| k.key_code)
}

/// Glyph for a logical modifier flag
pub fn modifier_glyph(flag: Modifiers) -> &'static str {
    if flag == Modifiers::CONTROL {
        "⌃"
    } else if flag == Modifiers::OPTION {
        "⌥"
    } else if flag == Modifiers::SHIFT {
        "⇧"
    } else if flag == Modifiers::COMMAND {
        "⌘"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_usage_round_trip() {
        for key in ModifierKey::ALL {
            assert_eq!(ModifierKey::from_usage(key.usage()), Some(key));
            assert_eq!(ModifierKey::from_key_code(key.key_code()), Some(key));
        }
    }

    #[test]
    fn test_right_option_collapses_to_option() {
        assert_eq!(ModifierKey::RightOption.flag(), Modifiers::OPTION);
        assert!(ModifierKey::RightOption.is_right());
        assert!(!ModifierKey::LeftOption.is_right());
    }

    #[test]
    fn test_usage_table() {
        assert_eq!(key_code_for_usage(0x04), Some(key_code::ANSI_A));
        assert_eq!(key_code_for_usage(0x2C), Some(key_code::SPACE));
        assert_eq!(key_code_for_usage(0xE6), None);
        assert_eq!(glyph(key_code::ANSI_K), Some("K"));
    }

    #[test]
    fn test_table_has_unique_entries() {
        for (i, a) in KEYS.iter().enumerate() {
            for b in &KEYS[i + 1..] {
                assert_ne!(a.key_code, b.key_code, "duplicate key code {}", a.glyph);
                assert_ne!(a.hid_usage, b.hid_usage, "duplicate usage {}", a.glyph);
            }
        }
    }
}
