//! Pointer location and left button state from Core Graphics

use core_graphics::event::CGEvent;
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use tracing::trace;

use crate::drag::{PointerSample, PointerSource};
use crate::geometry::Point;

const LEFT_MOUSE_BUTTON: u32 = 0;

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventSourceButtonState(state_id: i32, button: u32) -> bool;
}

/// Reads the combined session state; needs no accessibility permission
pub struct SystemPointer;

impl PointerSource for SystemPointer {
    fn sample(&self) -> PointerSample {
        let state_id = CGEventSourceStateID::CombinedSessionState;
        let button_down = unsafe { CGEventSourceButtonState(state_id as i32, LEFT_MOUSE_BUTTON) };

        let location = CGEventSource::new(state_id)
            .ok()
            .and_then(|source| CGEvent::new(source).ok())
            .map(|event| {
                let p = event.location();
                Point::new(p.x, p.y)
            });
        if location.is_none() {
            trace!("pointer location unavailable");
        }

        PointerSample {
            button_down,
            location: location.unwrap_or_default(),
        }
    }
}
