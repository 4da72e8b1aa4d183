//! Durable string and display label encodings for shortcuts
//!
//! Persisted form is a compact JSON record, e.g.
//! `{"keyCode":49,"modifiers":1048576}` for ⌘Space.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::keymap::{self, Modifiers};
use super::Shortcut;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShortcutRecord {
    key_code: u16,
    modifiers: u64,
}

/// Encode a shortcut into its durable string form
pub fn encode(shortcut: &Shortcut) -> String {
    let record = ShortcutRecord {
        key_code: shortcut.key_code,
        modifiers: shortcut.modifiers.bits(),
    };
    // Two integer fields cannot fail to serialize
    serde_json::to_string(&record).unwrap_or_default()
}

/// Decode a durable string; anything malformed means "no shortcut"
pub fn decode(raw: &str) -> Option<Shortcut> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<ShortcutRecord>(raw) {
        Ok(record) => Some(Shortcut {
            key_code: record.key_code,
            modifiers: Modifiers::from_bits_truncate(record.modifiers),
        }),
        Err(e) => {
            debug!(error = %e, "ignoring malformed stored shortcut");
            None
        }
    }
}

/// Human-readable label such as `⌃⌥K` or `Right ⌥`
pub fn display_label(shortcut: &Shortcut) -> String {
    let mut label = String::new();

    if let Some(key) = shortcut.modifier_key() {
        // Other held modifiers first, then the trigger modifier itself
        let others = shortcut.modifiers - key.flag();
        push_modifier_glyphs(&mut label, others);
        if key.is_right() {
            label.push_str("Right ");
        }
        label.push_str(keymap::modifier_glyph(key.flag()));
        return label;
    }

    push_modifier_glyphs(&mut label, shortcut.modifiers);
    match keymap::glyph(shortcut.key_code) {
        Some(glyph) => label.push_str(glyph),
        None => label.push_str(&format!("Key {:#04x}", shortcut.key_code)),
    }
    label
}

fn push_modifier_glyphs(label: &mut String, modifiers: Modifiers) {
    for flag in [
        Modifiers::CONTROL,
        Modifiers::OPTION,
        Modifiers::SHIFT,
        Modifiers::COMMAND,
    ] {
        if modifiers.contains(flag) {
            label.push_str(keymap::modifier_glyph(flag));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::key_code;

    #[test]
    fn test_encode_format() {
        let s = Shortcut::new(key_code::SPACE, Modifiers::COMMAND);
        assert_eq!(encode(&s), r#"{"keyCode":49,"modifiers":1048576}"#);
    }

    #[test]
    fn test_round_trip_configured_shortcuts() {
        let shortcuts = [
            Shortcut::new(key_code::SPACE, Modifiers::COMMAND | Modifiers::SHIFT),
            Shortcut::new(key_code::ANSI_K, Modifiers::CONTROL | Modifiers::OPTION),
            Shortcut::new(key_code::RIGHT_OPTION, Modifiers::empty()),
            Shortcut::new(key_code::RIGHT_COMMAND, Modifiers::COMMAND),
            Shortcut::new(key_code::ESCAPE, Modifiers::all()),
        ];
        for s in shortcuts {
            assert_eq!(decode(&encode(&s)), Some(s));
        }
    }

    #[test]
    fn test_malformed_is_none() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("not json"), None);
        assert_eq!(decode(r#"{"keyCode":"x","modifiers":0}"#), None);
        assert_eq!(decode(r#"{"modifiers":0}"#), None);
        assert_eq!(decode(r#"{"keyCode":70000,"modifiers":0}"#), None);
    }

    #[test]
    fn test_unknown_modifier_bits_dropped() {
        let decoded = decode(r#"{"keyCode":0,"modifiers":1048577}"#).unwrap();
        assert_eq!(decoded.modifiers, Modifiers::COMMAND);
    }

    #[test]
    fn test_labels() {
        let s = Shortcut::new(key_code::ANSI_K, Modifiers::COMMAND | Modifiers::CONTROL);
        assert_eq!(display_label(&s), "⌃⌘K");

        let s = Shortcut::new(key_code::RIGHT_OPTION, Modifiers::empty());
        assert_eq!(display_label(&s), "Right ⌥");

        let s = Shortcut::new(key_code::OPTION, Modifiers::OPTION);
        assert_eq!(display_label(&s), "⌥");

        let s = Shortcut::new(0x0A, Modifiers::SHIFT);
        assert_eq!(display_label(&s), "⇧Key 0x0a");
    }
}
