//! System-wide drag detection
//!
//! Polls pointer button state and the drag pasteboard instead of tapping
//! mouse events, so no accessibility permission is needed.

pub mod jiggle;
mod monitor;
mod session;
pub mod source;

pub use jiggle::{JiggleRecognizer, JiggleTuning};
pub use monitor::{DragMonitor, SAMPLE_INTERVAL};
pub use session::{DragConfig, DragSession, DragSessionState, PROMOTE_DISTANCE};
pub use source::{DragPasteboard, PayloadInfo, PayloadKind, PointerSample, PointerSource};
