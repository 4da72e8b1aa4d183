//! Events emitted by the detection engine
//!
//! Drag notifications are broadcast to any number of UI subscribers;
//! observable drag state is published separately as a [`DragSnapshot`].

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Discrete drag notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragEvent {
    /// A drag with a payload became active
    DragStarted {
        /// Cursor location when the session became active
        location: Point,
        /// Payload carries a droppable type
        supported: bool,
    },

    /// The active (or candidate) session finished
    DragEnded,

    /// The user shook the pointer during the drag
    JiggleDetected,

    /// Instant reveal delay elapsed during a supported drag
    RevealRequested,
}

impl std::fmt::Display for DragEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DragEvent::DragStarted { location, supported } => write!(
                f,
                "DRAG_STARTED ({:.0},{:.0}{})",
                location.x,
                location.y,
                if *supported { "" } else { ", unsupported" }
            ),
            DragEvent::DragEnded => write!(f, "DRAG_ENDED"),
            DragEvent::JiggleDetected => write!(f, "JIGGLE_DETECTED"),
            DragEvent::RevealRequested => write!(f, "REVEAL_REQUESTED"),
        }
    }
}

/// Observable drag state for UI controllers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DragSnapshot {
    pub is_dragging: bool,
    pub location: Point,
    pub did_jiggle: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = DragEvent::DragStarted {
            location: Point::new(10.0, 20.0),
            supported: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("drag_started"));
        assert!(json.contains("\"supported\":true"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"jiggle_detected"}"#;
        let event: DragEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, DragEvent::JiggleDetected);
    }

    #[test]
    fn test_display() {
        let event = DragEvent::DragStarted {
            location: Point::new(1.0, 2.0),
            supported: false,
        };
        assert_eq!(event.to_string(), "DRAG_STARTED (1,2, unsupported)");
        assert_eq!(DragEvent::DragEnded.to_string(), "DRAG_ENDED");
    }
}
