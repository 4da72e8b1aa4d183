//! Jiggle (shake) gesture recognition during an active drag
//!
//! Counts direction reversals of the pointer inside a short sliding window.
//! Enough reversals fire one notification, after which the recognizer stays
//! quiet until the re-arm delay has passed.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::geometry::{Point, Vector};

/// Dot product below which two successive directions count as a reversal
pub const REVERSAL_DOT_THRESHOLD: f64 = -0.3;

/// Reversals older than this are forgotten
pub const REVERSAL_WINDOW: Duration = Duration::from_millis(500);

/// Quiet period after a notification
pub const REARM_DELAY: Duration = Duration::from_secs(1);

pub const MIN_SENSITIVITY: f64 = 1.0;
pub const MAX_SENSITIVITY: f64 = 5.0;
pub const DEFAULT_SENSITIVITY: f64 = 3.0;

/// Thresholds derived from the user-facing sensitivity setting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JiggleTuning {
    /// Noise floor for a single sample's displacement (points)
    pub min_movement: f64,
    /// Reversals inside the window needed to fire
    pub required_reversals: usize,
}

impl JiggleTuning {
    /// Map sensitivity (1–5, higher is more eager) onto thresholds
    ///
    /// These are tuned product constants.
    pub fn from_sensitivity(sensitivity: f64) -> Self {
        let s = if sensitivity.is_finite() {
            sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
        } else {
            DEFAULT_SENSITIVITY
        };
        let min_movement = (12.0 - 2.0 * s).max(3.0);
        let required_reversals = (6 - s.round() as i64).clamp(2, 5) as usize;
        Self {
            min_movement,
            required_reversals,
        }
    }
}

impl Default for JiggleTuning {
    fn default() -> Self {
        Self::from_sensitivity(DEFAULT_SENSITIVITY)
    }
}

/// Recognizer state, owned by the drag session
#[derive(Debug, Default)]
pub struct JiggleRecognizer {
    reversals: VecDeque<Instant>,
    last_location: Option<Point>,
    last_direction: Option<Vector>,
    /// A notification went out and the re-arm deadline has not passed
    fired: bool,
    rearm_at: Option<Instant>,
    /// Public "did jiggle" signal
    active: bool,
}

impl JiggleRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reversal_count(&self) -> usize {
        self.reversals.len()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one active-drag sample; returns true when the gesture fires
    pub fn feed(&mut self, now: Instant, location: Point, tuning: JiggleTuning) -> bool {
        if self.fired && self.rearm_at.is_some_and(|at| now >= at) {
            trace!("jiggle re-armed");
            self.fired = false;
            self.rearm_at = None;
        }

        while let Some(&oldest) = self.reversals.front() {
            if now.duration_since(oldest) > REVERSAL_WINDOW {
                self.reversals.pop_front();
            } else {
                break;
            }
        }

        let Some(previous) = self.last_location else {
            self.last_location = Some(location);
            return false;
        };

        // Displacement is per sample; sub-threshold steps never add up
        let displacement = location.delta_from(previous);
        self.last_location = Some(location);
        if displacement.length() < tuning.min_movement {
            return false;
        }

        let Some(direction) = displacement.normalized() else {
            return false;
        };

        if let Some(last) = self.last_direction {
            if last.dot(direction) < REVERSAL_DOT_THRESHOLD {
                self.reversals.push_back(now);
                trace!(count = self.reversals.len(), "direction reversal");
            }
        }
        self.last_direction = Some(direction);

        if self.fired || self.reversals.len() < tuning.required_reversals {
            return false;
        }

        debug!(
            reversals = self.reversals.len(),
            required = tuning.required_reversals,
            "jiggle detected"
        );
        self.fired = true;
        self.active = true;
        self.rearm_at = Some(now + REARM_DELAY);
        self.reversals.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(50);

    /// Shake horizontally: the first move sets a direction, each
    /// following move reverses it once.
    fn shake(
        recognizer: &mut JiggleRecognizer,
        start: Instant,
        reversals: usize,
        tuning: JiggleTuning,
    ) -> (usize, Instant) {
        let mut fired = 0;
        let mut now = start;
        let amplitude = 40.0;
        recognizer.feed(now, Point::new(0.0, 0.0), tuning);
        for i in 0..=reversals {
            now += STEP;
            let x = if i % 2 == 0 { amplitude } else { 0.0 };
            if recognizer.feed(now, Point::new(x, 0.0), tuning) {
                fired += 1;
            }
        }
        (fired, now)
    }

    #[test]
    fn test_tuning_formula() {
        let t = JiggleTuning::from_sensitivity(3.0);
        assert_eq!(t.min_movement, 6.0);
        assert_eq!(t.required_reversals, 3);

        let t = JiggleTuning::from_sensitivity(1.0);
        assert_eq!(t.min_movement, 10.0);
        assert_eq!(t.required_reversals, 5);

        let t = JiggleTuning::from_sensitivity(5.0);
        assert_eq!(t.min_movement, 3.0);
        assert_eq!(t.required_reversals, 2);

        assert_eq!(JiggleTuning::from_sensitivity(42.0), JiggleTuning::from_sensitivity(5.0));
        assert_eq!(JiggleTuning::from_sensitivity(f64::NAN), JiggleTuning::default());
    }

    #[test]
    fn test_below_threshold_does_not_fire() {
        let tuning = JiggleTuning::default();
        let mut r = JiggleRecognizer::new();
        let (fired, _) = shake(&mut r, Instant::now(), tuning.required_reversals - 1, tuning);
        assert_eq!(fired, 0);
        assert!(!r.is_active());
    }

    #[test]
    fn test_threshold_fires_once_then_rearms() {
        let tuning = JiggleTuning::default();
        let mut r = JiggleRecognizer::new();
        let start = Instant::now();

        let (fired, now) = shake(&mut r, start, tuning.required_reversals, tuning);
        assert_eq!(fired, 1);
        assert!(r.is_active());

        // Keep shaking inside the re-arm delay
        let (fired, now) = shake(&mut r, now, tuning.required_reversals * 2, tuning);
        assert_eq!(fired, 0);

        // After the delay a fresh shake fires again
        let later = now + REARM_DELAY;
        let (fired, _) = shake(&mut r, later, tuning.required_reversals, tuning);
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_small_movements_are_noise() {
        let tuning = JiggleTuning::default();
        let mut r = JiggleRecognizer::new();
        let mut now = Instant::now();
        r.feed(now, Point::new(0.0, 0.0), tuning);
        for i in 0..20 {
            now += STEP;
            let x = if i % 2 == 0 { 2.0 } else { 0.0 };
            assert!(!r.feed(now, Point::new(x, 0.0), tuning));
        }
        assert_eq!(r.reversal_count(), 0);
    }

    #[test]
    fn test_small_steps_do_not_accumulate() {
        let tuning = JiggleTuning::default();
        let mut r = JiggleRecognizer::new();
        let mut now = Instant::now();
        let mut x = 0.0;
        r.feed(now, Point::new(x, 0.0), tuning);
        // 4pt steps, turning around every two samples: 8pt legs
        for i in 0..10 {
            now += Duration::from_millis(100);
            x += if (i / 2) % 2 == 0 { 4.0 } else { -4.0 };
            assert!(!r.feed(now, Point::new(x, 0.0), tuning));
        }
        assert_eq!(r.reversal_count(), 0);
        assert!(!r.is_active());
    }

    #[test]
    fn test_slow_reversals_fall_out_of_window() {
        let tuning = JiggleTuning::default();
        let mut r = JiggleRecognizer::new();
        let mut now = Instant::now();
        r.feed(now, Point::new(0.0, 0.0), tuning);
        for i in 0..10 {
            now += Duration::from_millis(600);
            let x = if i % 2 == 0 { 40.0 } else { 0.0 };
            assert!(!r.feed(now, Point::new(x, 0.0), tuning));
        }
        assert!(r.reversal_count() <= 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let tuning = JiggleTuning::default();
        let mut r = JiggleRecognizer::new();
        let (fired, now) = shake(&mut r, Instant::now(), tuning.required_reversals, tuning);
        assert_eq!(fired, 1);

        r.reset();
        assert!(!r.is_active());
        let (fired, _) = shake(&mut r, now + STEP, tuning.required_reversals, tuning);
        assert_eq!(fired, 1);
    }
}
