//! Drag monitor service
//!
//! Owns a [`DragSession`] and drives it from a single sampling task. The
//! next sample is scheduled only after the current one completes, so
//! samples never overlap. External overrides take the same short lock as
//! the sampler and publish through the same channels.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use super::session::{DragConfig, DragSession};
use super::source::{DragPasteboard, PointerSource};
use crate::events::{DragEvent, DragSnapshot};
use crate::geometry::Point;
use crate::task::{sleep_unless_cancelled, ScheduledTask};

/// Time between samples
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

const EVENT_CAPACITY: usize = 64;

struct Shared {
    session: Mutex<DragSession>,
    pointer: Arc<dyn PointerSource>,
    pasteboard: Arc<dyn DragPasteboard>,
    config: watch::Receiver<DragConfig>,
    events: broadcast::Sender<DragEvent>,
    snapshot: watch::Sender<DragSnapshot>,
}

impl Shared {
    fn tick(&self, now: Instant) {
        let pointer = self.pointer.sample();
        let config = self.config.borrow().clone();
        let (events, snapshot) = {
            let mut session = self.session.lock();
            let events = session.sample(now, pointer, self.pasteboard.as_ref(), &config);
            (events, session.snapshot())
        };
        self.publish(events, snapshot);
    }

    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut DragSession) -> Option<DragEvent>,
    {
        let (event, snapshot) = {
            let mut session = self.session.lock();
            let event = f(&mut session);
            (event, session.snapshot())
        };
        self.publish(event, snapshot);
    }

    fn publish(&self, events: impl IntoIterator<Item = DragEvent>, snapshot: DragSnapshot) {
        self.snapshot.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
        for event in events {
            debug!(%event, "emitting drag event");
            // No subscribers is fine
            let _ = self.events.send(event);
        }
    }
}

/// Detects system-wide drags by polling pointer and pasteboard state
pub struct DragMonitor {
    shared: Arc<Shared>,
    task: Mutex<Option<ScheduledTask>>,
}

impl DragMonitor {
    pub fn new(
        pointer: Arc<dyn PointerSource>,
        pasteboard: Arc<dyn DragPasteboard>,
        config: watch::Receiver<DragConfig>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (snapshot, _) = watch::channel(DragSnapshot::default());
        let baseline = pasteboard.change_count();
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(DragSession::new(baseline)),
                pointer,
                pasteboard,
                config,
                events,
                snapshot,
            }),
            task: Mutex::new(None),
        }
    }

    /// Discrete drag notifications
    pub fn subscribe(&self) -> broadcast::Receiver<DragEvent> {
        self.shared.events.subscribe()
    }

    /// Observable `is_dragging` / `location` / `did_jiggle`
    pub fn watch(&self) -> watch::Receiver<DragSnapshot> {
        self.shared.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> DragSnapshot {
        self.shared.session.lock().snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_cancelled())
    }

    /// Begin sampling; no-op if already running
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_cancelled()) {
            return;
        }

        let baseline = self.shared.pasteboard.change_count();
        self.shared.session.lock().set_baseline(baseline);
        info!(baseline, interval_ms = SAMPLE_INTERVAL.as_millis() as u64, "drag monitor started");

        let shared = Arc::clone(&self.shared);
        *task = Some(ScheduledTask::spawn(move |token| async move {
            loop {
                if token.is_cancelled() {
                    break;
                }
                shared.tick(tokio::time::Instant::now().into_std());
                if !sleep_unless_cancelled(&token, SAMPLE_INTERVAL).await {
                    break;
                }
            }
            debug!("drag sampling loop exited");
        }));
    }

    /// Stop sampling and drop any session state; no-op if stopped
    pub fn stop(&self) {
        let Some(task) = self.task.lock().take() else {
            return;
        };
        task.cancel();
        self.force_reset();
        info!("drag monitor stopped");
    }

    pub fn reset_gesture(&self) {
        self.shared.update(|session| {
            session.reset_gesture();
            None
        });
    }

    /// Override drag state for drags delivered outside the poller
    pub fn force_set_dragging(&self, active: bool, location: Option<Point>) {
        let now = tokio::time::Instant::now().into_std();
        let change_count = self.shared.pasteboard.change_count();
        self.shared
            .update(|session| session.force_set_dragging(active, location, now, change_count));
    }

    /// Clear everything, e.g. after the screen was unlocked
    pub fn force_reset(&self) {
        let change_count = self.shared.pasteboard.change_count();
        self.shared
            .update(|session| session.force_reset(change_count));
    }

    pub fn set_reveal_suppressed(&self, suppressed: bool) {
        self.shared.update(|session| {
            session.set_reveal_suppressed(suppressed);
            None
        });
    }
}

impl Drop for DragMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::source::PointerSample;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakePointer {
        state: Mutex<PointerSample>,
        samples: AtomicUsize,
    }

    impl FakePointer {
        fn set(&self, button_down: bool, x: f64, y: f64) {
            *self.state.lock() = PointerSample {
                button_down,
                location: Point::new(x, y),
            };
        }
    }

    impl PointerSource for FakePointer {
        fn sample(&self) -> PointerSample {
            self.samples.fetch_add(1, Ordering::SeqCst);
            *self.state.lock()
        }
    }

    #[derive(Default)]
    struct FakePasteboard {
        change_count: AtomicI64,
        types: Mutex<Vec<String>>,
    }

    impl FakePasteboard {
        fn put(&self, uti: &str) {
            *self.types.lock() = vec![uti.to_string()];
            self.change_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl DragPasteboard for FakePasteboard {
        fn change_count(&self) -> i64 {
            self.change_count.load(Ordering::SeqCst)
        }
        fn types(&self) -> Vec<String> {
            self.types.lock().clone()
        }
        fn can_read_urls(&self) -> bool {
            false
        }
    }

    fn monitor() -> (DragMonitor, Arc<FakePointer>, Arc<FakePasteboard>, watch::Sender<DragConfig>) {
        let pointer = Arc::new(FakePointer::default());
        let pasteboard = Arc::new(FakePasteboard::default());
        let (config_tx, config_rx) = watch::channel(DragConfig::default());
        let monitor = DragMonitor::new(pointer.clone(), pasteboard.clone(), config_rx);
        (monitor, pointer, pasteboard, config_tx)
    }

    fn drain(rx: &mut broadcast::Receiver<DragEvent>) -> Vec<DragEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_detects_drag_start_and_end() {
        let (monitor, pointer, pasteboard, _config) = monitor();
        let mut rx = monitor.subscribe();
        let snapshots = monitor.watch();
        monitor.start();

        pointer.set(true, 100.0, 100.0);
        tokio::time::sleep(SAMPLE_INTERVAL).await;
        pasteboard.put("public.file-url");
        pointer.set(true, 120.0, 100.0);
        tokio::time::sleep(SAMPLE_INTERVAL * 2).await;

        assert!(snapshots.borrow().is_dragging);
        assert_eq!(snapshots.borrow().location, Point::new(120.0, 100.0));

        pointer.set(false, 120.0, 100.0);
        tokio::time::sleep(SAMPLE_INTERVAL * 2).await;
        assert!(!monitor.snapshot().is_dragging);

        let events = drain(&mut rx);
        let started = events
            .iter()
            .filter(|e| matches!(e, DragEvent::DragStarted { .. }))
            .count();
        let ended = events.iter().filter(|e| **e == DragEvent::DragEnded).count();
        assert_eq!(started, 1);
        assert_eq!(ended, 1);
        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let (monitor, pointer, _pasteboard, _config) = monitor();
        monitor.start();
        monitor.start();
        assert!(monitor.is_running());

        tokio::time::sleep(Duration::from_millis(950)).await;
        // One loop: an immediate sample plus one per interval
        assert_eq!(pointer.samples.load(Ordering::SeqCst), 10);
        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_sampling() {
        let (monitor, pointer, _pasteboard, _config) = monitor();
        monitor.start();
        tokio::time::sleep(Duration::from_millis(250)).await;
        monitor.stop();
        monitor.stop();
        assert!(!monitor.is_running());

        let seen = pointer.samples.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(pointer.samples.load(Ordering::SeqCst), seen);

        // Restart works after a stop
        monitor.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(pointer.samples.load(Ordering::SeqCst) > seen);
        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_self_heal_within_one_interval() {
        let (monitor, pointer, _pasteboard, _config) = monitor();
        let mut rx = monitor.subscribe();
        monitor.start();

        monitor.force_set_dragging(true, Some(Point::new(5.0, 5.0)));
        assert!(monitor.snapshot().is_dragging);

        // Button is up: next sample must clear the stale session
        pointer.set(false, 5.0, 5.0);
        tokio::time::sleep(SAMPLE_INTERVAL).await;
        assert!(!monitor.snapshot().is_dragging);

        tokio::time::sleep(SAMPLE_INTERVAL * 3).await;
        let events = drain(&mut rx);
        assert_eq!(events.iter().filter(|e| **e == DragEvent::DragEnded).count(), 1);
        monitor.stop();
    }

    #[tokio::test]
    async fn test_force_set_notifies_once() {
        let (monitor, _pointer, _pasteboard, _config) = monitor();
        let mut rx = monitor.subscribe();

        monitor.force_set_dragging(true, Some(Point::new(1.0, 2.0)));
        monitor.force_set_dragging(true, Some(Point::new(1.0, 2.0)));
        monitor.force_set_dragging(false, None);
        monitor.force_set_dragging(false, None);

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                DragEvent::DragStarted {
                    location: Point::new(1.0, 2.0),
                    supported: true
                },
                DragEvent::DragEnded
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_changes_apply_on_next_sample() {
        let (monitor, pointer, pasteboard, config) = monitor();
        let mut rx = monitor.subscribe();
        monitor.start();

        pointer.set(true, 0.0, 0.0);
        tokio::time::sleep(SAMPLE_INTERVAL).await;
        pasteboard.put("public.file-url");
        tokio::time::sleep(SAMPLE_INTERVAL).await;
        drain(&mut rx);

        config.send_modify(|c| c.instant_reveal = Some(Duration::ZERO));
        tokio::time::sleep(SAMPLE_INTERVAL * 2).await;
        assert!(drain(&mut rx).contains(&DragEvent::RevealRequested));
        monitor.stop();
    }
}
