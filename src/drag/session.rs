//! Drag session state machine
//!
//! Turns a stream of pointer/pasteboard samples into drag notifications:
//! Idle → Candidate (button down) → Active (payload confirmed) → Idle.
//! Every step is a short, non-blocking computation; the caller owns the
//! timeline and supplies `now`.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::jiggle::{JiggleRecognizer, JiggleTuning, DEFAULT_SENSITIVITY};
use super::source::{DragPasteboard, PayloadInfo, PointerSample};
use crate::events::{DragEvent, DragSnapshot};
use crate::geometry::Point;

/// Cursor travel (points) that confirms a drag from an unreliable source
pub const PROMOTE_DISTANCE: f64 = 10.0;

/// Configuration read by the session on every sample
#[derive(Debug, Clone, PartialEq)]
pub struct DragConfig {
    /// Jiggle sensitivity, 1–5
    pub sensitivity: f64,
    pub jiggle_enabled: bool,
    /// A dedicated reveal shortcut replaces the jiggle gesture
    pub reveal_shortcut_configured: bool,
    /// Reveal automatically after the drag has been active this long
    pub instant_reveal: Option<Duration>,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            jiggle_enabled: true,
            reveal_shortcut_configured: false,
            instant_reveal: None,
        }
    }
}

impl DragConfig {
    /// Tuning for the jiggle recognizer, or None when the gesture is off
    pub fn jiggle_tuning(&self) -> Option<JiggleTuning> {
        if self.jiggle_enabled && !self.reveal_shortcut_configured {
            Some(JiggleTuning::from_sensitivity(self.sensitivity))
        } else {
            None
        }
    }
}

/// Lifecycle of a single drag
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragSessionState {
    #[default]
    Idle,
    /// Button is down but no payload has been confirmed
    Candidate { start: Point, started_at: Instant },
    /// A payload is on the drag pasteboard
    Active {
        location: Point,
        supported: bool,
        reveal_suppressed: bool,
        activated_at: Instant,
        revealed: bool,
    },
}

impl std::fmt::Display for DragSessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DragSessionState::Idle => write!(f, "Idle"),
            DragSessionState::Candidate { .. } => write!(f, "Candidate"),
            DragSessionState::Active { .. } => write!(f, "Active"),
        }
    }
}

/// Session plus embedded gesture recognizer
#[derive(Debug)]
pub struct DragSession {
    state: DragSessionState,
    jiggle: JiggleRecognizer,
    /// Pasteboard change counter at monitor start / last session end
    baseline_change_count: i64,
    /// Suppression requested before the session became active
    suppress_pending: bool,
    last_location: Point,
}

impl DragSession {
    pub fn new(baseline_change_count: i64) -> Self {
        Self {
            state: DragSessionState::Idle,
            jiggle: JiggleRecognizer::new(),
            baseline_change_count,
            suppress_pending: false,
            last_location: Point::default(),
        }
    }

    pub fn state(&self) -> DragSessionState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragSessionState::Active { .. })
    }

    pub fn snapshot(&self) -> DragSnapshot {
        DragSnapshot {
            is_dragging: self.is_dragging(),
            location: self.last_location,
            did_jiggle: self.jiggle.is_active(),
        }
    }

    pub fn set_baseline(&mut self, change_count: i64) {
        self.baseline_change_count = change_count;
    }

    /// Process one poll of pointer and pasteboard state
    pub fn sample(
        &mut self,
        now: Instant,
        pointer: PointerSample,
        pasteboard: &dyn DragPasteboard,
        config: &DragConfig,
    ) -> Vec<DragEvent> {
        let mut events = Vec::new();

        if !pointer.button_down {
            match self.state {
                DragSessionState::Idle => {}
                DragSessionState::Active { .. } => {
                    // Also covers a mouse-up that was never sampled, e.g.
                    // across a lock/unlock cycle
                    info!("drag ended");
                    self.finish(pasteboard.change_count(), &mut events);
                }
                DragSessionState::Candidate { .. } => {
                    debug!("candidate released without payload");
                    self.finish(pasteboard.change_count(), &mut events);
                }
            }
            return events;
        }

        self.last_location = pointer.location;

        if self.state == DragSessionState::Idle {
            self.jiggle.reset();
            self.state = DragSessionState::Candidate {
                start: pointer.location,
                started_at: now,
            };
        }

        if let DragSessionState::Candidate { start, started_at } = self.state {
            let info = PayloadInfo::inspect(pasteboard);
            let changed = pasteboard.change_count() != self.baseline_change_count;
            let moved = pointer.location.distance_to(start) > PROMOTE_DISTANCE;

            if changed || (info.unreliable_source && moved) {
                info!(
                    supported = info.supported,
                    changed,
                    unreliable_source = info.unreliable_source,
                    pending_ms = now.duration_since(started_at).as_millis() as u64,
                    "drag started"
                );
                self.state = DragSessionState::Active {
                    location: pointer.location,
                    supported: info.supported,
                    reveal_suppressed: std::mem::take(&mut self.suppress_pending),
                    activated_at: now,
                    revealed: false,
                };
                events.push(DragEvent::DragStarted {
                    location: pointer.location,
                    supported: info.supported,
                });
            }
        }

        if let DragSessionState::Active {
            location,
            supported,
            reveal_suppressed,
            activated_at,
            revealed,
        } = &mut self.state
        {
            *location = pointer.location;
            if !*supported || *reveal_suppressed {
                return events;
            }

            if let Some(tuning) = config.jiggle_tuning() {
                if self.jiggle.feed(now, pointer.location, tuning) {
                    events.push(DragEvent::JiggleDetected);
                }
            }

            if let Some(delay) = config.instant_reveal {
                if !*revealed && now.duration_since(*activated_at) >= delay {
                    *revealed = true;
                    debug!(delay_ms = delay.as_millis() as u64, "instant reveal");
                    events.push(DragEvent::RevealRequested);
                }
            }
        }

        events
    }

    /// Override the session for drags the poller cannot see
    ///
    /// Returns `None` when the requested state already holds.
    pub fn force_set_dragging(
        &mut self,
        active: bool,
        location: Option<Point>,
        now: Instant,
        change_count: i64,
    ) -> Option<DragEvent> {
        if active == self.is_dragging() {
            if let (Some(point), DragSessionState::Active { location: current, .. }) =
                (location, &mut self.state)
            {
                *current = point;
                self.last_location = point;
            }
            return None;
        }

        self.jiggle.reset();

        if active {
            let location = location.unwrap_or(self.last_location);
            self.last_location = location;
            info!(from = %self.state, "drag forced active");
            self.state = DragSessionState::Active {
                location,
                supported: true,
                reveal_suppressed: std::mem::take(&mut self.suppress_pending),
                activated_at: now,
                revealed: false,
            };
            Some(DragEvent::DragStarted {
                location,
                supported: true,
            })
        } else {
            info!("drag forced idle");
            if let Some(point) = location {
                self.last_location = point;
            }
            self.state = DragSessionState::Idle;
            self.suppress_pending = false;
            self.baseline_change_count = change_count;
            Some(DragEvent::DragEnded)
        }
    }

    /// Drop all session and gesture state
    ///
    /// Emits `DragEnded` when an active session was discarded.
    pub fn force_reset(&mut self, change_count: i64) -> Option<DragEvent> {
        let was_dragging = self.is_dragging();
        if self.state != DragSessionState::Idle {
            info!(from = %self.state, "drag session reset");
        }
        self.state = DragSessionState::Idle;
        self.jiggle.reset();
        self.suppress_pending = false;
        self.baseline_change_count = change_count;
        was_dragging.then_some(DragEvent::DragEnded)
    }

    pub fn reset_gesture(&mut self) {
        self.jiggle.reset();
    }

    /// Mark the current (or about-to-start) session as self-originated
    pub fn set_reveal_suppressed(&mut self, suppressed: bool) {
        match &mut self.state {
            DragSessionState::Active {
                reveal_suppressed, ..
            } => *reveal_suppressed = suppressed,
            _ => self.suppress_pending = suppressed,
        }
    }

    fn finish(&mut self, change_count: i64, events: &mut Vec<DragEvent>) {
        self.state = DragSessionState::Idle;
        self.jiggle.reset();
        self.suppress_pending = false;
        self.baseline_change_count = change_count;
        events.push(DragEvent::DragEnded);
    }
}
