//! Cooldown guard shared by both hotkey channels

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Minimum spacing between two callback deliveries
pub const COOLDOWN: Duration = Duration::from_millis(300);

/// Lets at most one trigger through per cooldown interval
#[derive(Debug)]
pub struct Debouncer {
    cooldown: Duration,
    last_fired: Mutex<Option<Instant>>,
}

impl Debouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: Mutex::new(None),
        }
    }

    /// Returns true if the caller should deliver the event
    ///
    /// Never blocks: if the other channel holds the guard right now it is
    /// delivering this same press, so the caller backs off.
    pub fn try_fire(&self, now: Instant) -> bool {
        let Some(mut last) = self.last_fired.try_lock() else {
            return false;
        };
        if let Some(previous) = *last {
            if now.saturating_duration_since(previous) < self.cooldown {
                return false;
            }
        }
        *last = Some(now);
        true
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_trigger_fires() {
        let d = Debouncer::default();
        assert!(d.try_fire(Instant::now()));
    }

    #[test]
    fn test_trigger_inside_cooldown_is_dropped() {
        let d = Debouncer::default();
        let t0 = Instant::now();
        assert!(d.try_fire(t0));
        assert!(!d.try_fire(t0));
        assert!(!d.try_fire(t0 + Duration::from_millis(299)));
        assert!(d.try_fire(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_dropped_trigger_does_not_extend_cooldown() {
        let d = Debouncer::default();
        let t0 = Instant::now();
        assert!(d.try_fire(t0));
        assert!(!d.try_fire(t0 + Duration::from_millis(200)));
        assert!(d.try_fire(t0 + Duration::from_millis(350)));
    }

    #[test]
    fn test_out_of_order_timestamp_is_dropped() {
        let d = Debouncer::default();
        let t0 = Instant::now();
        assert!(d.try_fire(t0 + Duration::from_millis(100)));
        assert!(!d.try_fire(t0));
    }
}
