//! Polled inputs for the drag monitor: pointer state and the drag pasteboard

use crate::geometry::Point;

/// One poll of the system-wide pointer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    pub button_down: bool,
    pub location: Point,
}

/// System-wide pointer state, readable without accessibility permission
pub trait PointerSource: Send + Sync {
    fn sample(&self) -> PointerSample;
}

/// The shared pasteboard that accumulates an in-progress drag's payload
pub trait DragPasteboard: Send + Sync {
    /// Opaque counter that changes whenever the contents change
    fn change_count(&self) -> i64;
    /// Declared type identifiers of the current contents
    fn types(&self) -> Vec<String>;
    /// Whether the contents can be read as URLs
    fn can_read_urls(&self) -> bool;
}

/// Coarse payload classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    File,
    Url,
    Image,
    Movie,
    Mail,
    Promise,
    Text,
}

impl PayloadKind {
    /// Sources whose pasteboard signaling can lag behind the drag
    pub fn is_unreliable_source(self) -> bool {
        matches!(self, PayloadKind::Mail | PayloadKind::Promise)
    }

    pub fn is_droppable(self) -> bool {
        !matches!(self, PayloadKind::Text)
    }
}

const TYPE_TABLE: &[(&str, PayloadKind)] = &[
    ("public.file-url", PayloadKind::File),
    ("NSFilenamesPboardType", PayloadKind::File),
    ("public.url", PayloadKind::Url),
    ("Apple URL pasteboard type", PayloadKind::Url),
    ("public.image", PayloadKind::Image),
    ("public.png", PayloadKind::Image),
    ("public.jpeg", PayloadKind::Image),
    ("public.tiff", PayloadKind::Image),
    ("public.heic", PayloadKind::Image),
    ("public.movie", PayloadKind::Movie),
    ("public.mpeg-4", PayloadKind::Movie),
    ("com.apple.quicktime-movie", PayloadKind::Movie),
    ("com.apple.mail.PasteboardTypeMessageTransfer", PayloadKind::Mail),
    ("com.apple.mail.PasteboardTypeAutomator", PayloadKind::Mail),
    ("com.apple.mail.message", PayloadKind::Mail),
    ("com.apple.pasteboard.promised-file-url", PayloadKind::Promise),
    ("com.apple.pasteboard.promised-file-content-type", PayloadKind::Promise),
    ("com.apple.NSFilePromiseItemMetaData", PayloadKind::Promise),
    ("NSPromiseContentsPboardType", PayloadKind::Promise),
    ("Apple files promise pasteboard type", PayloadKind::Promise),
    ("public.utf8-plain-text", PayloadKind::Text),
    ("public.plain-text", PayloadKind::Text),
    ("NSStringPboardType", PayloadKind::Text),
];

pub fn classify_type(identifier: &str) -> Option<PayloadKind> {
    TYPE_TABLE
        .iter()
        .find(|(id, _)| *id == identifier)
        .map(|(_, kind)| *kind)
}

/// Result of inspecting the drag pasteboard while a session is a candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadInfo {
    /// At least one declared type is droppable, or the URL probe succeeded
    pub supported: bool,
    /// Payload comes from a source with unreliable change signaling
    pub unreliable_source: bool,
}

impl PayloadInfo {
    pub fn inspect(pasteboard: &dyn DragPasteboard) -> Self {
        let mut info = PayloadInfo::default();
        for kind in pasteboard.types().iter().filter_map(|t| classify_type(t)) {
            info.supported |= kind.is_droppable();
            info.unreliable_source |= kind.is_unreliable_source();
        }
        if !info.supported {
            info.supported = pasteboard.can_read_urls();
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        types: Vec<&'static str>,
        urls: bool,
    }

    impl DragPasteboard for Fixed {
        fn change_count(&self) -> i64 {
            0
        }
        fn types(&self) -> Vec<String> {
            self.types.iter().map(|t| t.to_string()).collect()
        }
        fn can_read_urls(&self) -> bool {
            self.urls
        }
    }

    #[test]
    fn test_file_payload() {
        let pb = Fixed {
            types: vec!["public.file-url", "public.utf8-plain-text"],
            urls: false,
        };
        let info = PayloadInfo::inspect(&pb);
        assert!(info.supported);
        assert!(!info.unreliable_source);
    }

    #[test]
    fn test_text_only_is_not_supported() {
        let pb = Fixed {
            types: vec!["public.utf8-plain-text"],
            urls: false,
        };
        assert!(!PayloadInfo::inspect(&pb).supported);
    }

    #[test]
    fn test_url_probe_fallback() {
        let pb = Fixed {
            types: vec!["com.example.custom"],
            urls: true,
        };
        assert!(PayloadInfo::inspect(&pb).supported);
    }

    #[test]
    fn test_mail_and_promise_are_unreliable() {
        let pb = Fixed {
            types: vec!["com.apple.mail.PasteboardTypeMessageTransfer"],
            urls: false,
        };
        let info = PayloadInfo::inspect(&pb);
        assert!(info.supported && info.unreliable_source);

        assert_eq!(
            classify_type("com.apple.NSFilePromiseItemMetaData"),
            Some(PayloadKind::Promise)
        );
    }
}
