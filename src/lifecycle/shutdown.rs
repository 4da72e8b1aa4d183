//! Signal handling for graceful shutdown and session resets

use std::io;

use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::debug;

/// What the daemon should do in response to a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// SIGTERM or SIGINT
    Shutdown,
    /// SIGHUP: treat as a session boundary and resync drag state
    Resync,
}

/// Handles SIGTERM, SIGINT and SIGHUP
pub struct Signals {
    sigterm: Signal,
    sigint: Signal,
    sighup: Signal,
}

impl Signals {
    /// Register the handlers; fails only if the runtime cannot install them
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
            sighup: signal(SignalKind::hangup())?,
        })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> LifecycleEvent {
        tokio::select! {
            _ = self.sigterm.recv() => {
                debug!("received SIGTERM");
                LifecycleEvent::Shutdown
            }
            _ = self.sigint.recv() => {
                debug!("received SIGINT");
                LifecycleEvent::Shutdown
            }
            _ = self.sighup.recv() => {
                debug!("received SIGHUP");
                LifecycleEvent::Resync
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    extern "C" {
        fn raise(sig: i32) -> i32;
    }

    // POSIX signal number, identical on Linux and macOS
    const SIGHUP: i32 = 1;

    #[tokio::test]
    async fn test_sighup_maps_to_resync() {
        let mut signals = tokio_test::assert_ok!(Signals::new());
        // SAFETY: a handler for SIGHUP is installed above.
        unsafe { raise(SIGHUP) };
        assert_eq!(signals.recv().await, LifecycleEvent::Resync);
    }
}
