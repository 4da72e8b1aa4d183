//! Backends for platforms without drag or HID support

use crate::drag::{DragPasteboard, PointerSample, PointerSource};
use crate::hotkey::{HidBackend, HidSink, HidSubscription, HotkeyError};

pub struct NoPointer;

impl PointerSource for NoPointer {
    fn sample(&self) -> PointerSample {
        PointerSample::default()
    }
}

pub struct EmptyPasteboard;

impl DragPasteboard for EmptyPasteboard {
    fn change_count(&self) -> i64 {
        0
    }

    fn types(&self) -> Vec<String> {
        Vec::new()
    }

    fn can_read_urls(&self) -> bool {
        false
    }
}

pub struct UnavailableHid;

impl HidBackend for UnavailableHid {
    fn open(&self, _sink: HidSink) -> Result<Box<dyn HidSubscription>, HotkeyError> {
        Err(HotkeyError::Unavailable(
            "raw HID keyboard access is only implemented on macOS".into(),
        ))
    }

    fn check_access(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_inert_backends_report_nothing() {
        assert!(!NoPointer.sample().button_down);
        assert_eq!(EmptyPasteboard.change_count(), 0);
        assert!(EmptyPasteboard.types().is_empty());
        assert!(!UnavailableHid.check_access());
        assert!(UnavailableHid.open(Arc::new(|_| {})).is_err());
    }
}
