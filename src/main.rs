//! shelf-input-daemon: runs the input detection engine standalone
//!
//! Logs drag sessions, jiggle gestures and reveal-shortcut presses. The
//! shelf UI embeds the library directly; this binary is for diagnosing
//! detection on a given machine.
//!
//! Signals:
//! - SIGTERM / SIGINT: shut down
//! - SIGHUP: session boundary (e.g. screen unlock), resets drag state

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use shelf_input::config::Config;
use shelf_input::drag::DragMonitor;
use shelf_input::hotkey::{
    GlobalHotKeyBackend, HighLevelBackend, HotKeyChannel, UnavailableHighLevel,
};
use shelf_input::permissions::{Capability, PermissionCache};
use shelf_input::platform;
use shelf_input::store::MemoryStore;

mod lifecycle;

use crate::lifecycle::{LifecycleEvent, Signals};

/// How often the main thread drains OS events
const EVENT_PUMP_INTERVAL: Duration = Duration::from_millis(20);

// OS hotkey registration is tied to the main thread
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "shelf-input-daemon starting"
    );

    let config = Config::load()?;
    info!(
        sensitivity = config.drag.sensitivity,
        jiggle = config.drag.jiggle_enabled,
        reveal_shortcut = ?config.reveal_shortcut.map(|s| s.to_string()),
        drag = config.drag_enabled,
        hotkey = config.hotkey_enabled,
        "configuration loaded"
    );

    let mut signals = Signals::new()?;

    // Grants are forgotten on restart; an embedding host passes a durable
    // SettingsStore so AssumedActive can apply on a fresh launch
    let store = Arc::new(MemoryStore::new());
    let permissions = PermissionCache::new(store);
    let hid = platform::hid_backend();
    info!(
        input_monitoring = permissions.is_granted(Capability::InputMonitoring, hid.check_access()),
        "permission status"
    );

    // Held for the lifetime of the daemon; later config reloads go through it
    let (_config_tx, config_rx) = watch::channel(config.drag.clone());
    let monitor = DragMonitor::new(
        platform::pointer_source(),
        platform::drag_pasteboard(),
        config_rx,
    );
    let mut drag_events = monitor.subscribe();
    if config.drag_enabled {
        monitor.start();
    }

    let (reveal_tx, mut reveal_rx) = mpsc::unbounded_channel::<()>();
    let mut hotkeys = None;
    if let (true, Some(shortcut)) = (config.hotkey_enabled, config.reveal_shortcut) {
        let high_level: Box<dyn HighLevelBackend> = match GlobalHotKeyBackend::new() {
            Ok(backend) => Box::new(backend),
            Err(e) => {
                warn!(error = %e, "OS hotkey facility unavailable, using HID channel only");
                Box::new(UnavailableHighLevel {
                    reason: e.to_string(),
                })
            }
        };
        let mut channel = HotKeyChannel::new(high_level, Arc::clone(&hid), permissions.clone());
        let handle = channel.register(shortcut, config.allow_low_level_fallback, move || {
            let _ = reveal_tx.send(());
        });
        if let Some(status) = channel.status(handle) {
            info!(%shortcut, high_level = ?status.high_level, low_level = ?status.low_level, "reveal shortcut registered");
        }
        hotkeys = Some((channel, handle));
    }

    let mut pump = tokio::time::interval(EVENT_PUMP_INTERVAL);

    info!("daemon initialized, entering main loop");

    loop {
        tokio::select! {
            event = drag_events.recv() => match event {
                Ok(event) => info!(%event, "drag event"),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "drag event receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            Some(()) = reveal_rx.recv() => {
                let snapshot = monitor.snapshot();
                info!(dragging = snapshot.is_dragging, "reveal shortcut pressed");
            }

            _ = pump.tick() => {
                platform::pump_event_loop();
            }

            signal = signals.recv() => match signal {
                LifecycleEvent::Shutdown => {
                    info!("shutdown signal received");
                    break;
                }
                LifecycleEvent::Resync => {
                    info!("session boundary, resetting drag state");
                    monitor.force_reset();
                    if let Some((channel, handle)) = &hotkeys {
                        debug!(status = ?channel.status(*handle), "reveal shortcut status");
                    }
                }
            },
        }
    }

    info!("shutting down...");

    if let Some((mut channel, handle)) = hotkeys.take() {
        channel.unregister(handle);
    }
    monitor.stop();

    info!("shelf-input-daemon stopped");

    Ok(())
}
