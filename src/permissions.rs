//! Sticky record of OS privacy capabilities that were granted at least once
//!
//! Right after the user grants Input Monitoring the privacy subsystem can
//! keep reporting "denied" for a while. Remembering that a capability has
//! worked before lets callers ride out that window instead of reporting
//! a missing permission.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::store::SettingsStore;

/// OS privacy capabilities the engine cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Raw HID keyboard access (low-level hotkey channel)
    InputMonitoring,
    /// Accessibility API access
    Accessibility,
}

impl Capability {
    fn key(self) -> String {
        format!("permissions.granted.{self}")
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::InputMonitoring => write!(f, "input_monitoring"),
            Capability::Accessibility => write!(f, "accessibility"),
        }
    }
}

/// Set-once "ever granted" flags stored in the host's settings
///
/// Only as durable as the injected store: back it with the host's
/// preferences, not [`crate::store::MemoryStore`], in production.
#[derive(Clone)]
pub struct PermissionCache {
    store: Arc<dyn SettingsStore>,
}

impl PermissionCache {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Record that `capability` was exercised successfully
    pub fn mark_granted(&self, capability: Capability) {
        if self.cached(capability) {
            return;
        }
        info!(%capability, "recording permission grant");
        self.store.set_bool(&capability.key(), true);
    }

    /// `live_check || ever granted`; a positive live check is cached
    pub fn is_granted(&self, capability: Capability, live_check: bool) -> bool {
        if live_check {
            self.mark_granted(capability);
            return true;
        }
        let cached = self.cached(capability);
        if cached {
            debug!(%capability, "live check negative, using cached grant");
        }
        cached
    }

    fn cached(&self, capability: Capability) -> bool {
        self.store.get_bool(&capability.key()).unwrap_or(false)
    }
}

impl fmt::Debug for PermissionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionCache")
            .field("input_monitoring", &self.cached(Capability::InputMonitoring))
            .field("accessibility", &self.cached(Capability::Accessibility))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cache() -> PermissionCache {
        PermissionCache::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_never_granted() {
        let cache = cache();
        assert!(!cache.is_granted(Capability::InputMonitoring, false));
    }

    #[test]
    fn test_cached_grant_masks_negative_live_check() {
        let cache = cache();
        cache.mark_granted(Capability::InputMonitoring);
        assert!(cache.is_granted(Capability::InputMonitoring, false));
        assert!(!cache.is_granted(Capability::Accessibility, false));
    }

    #[test]
    fn test_positive_live_check_is_remembered() {
        let cache = cache();
        assert!(cache.is_granted(Capability::Accessibility, true));
        assert!(cache.is_granted(Capability::Accessibility, false));
    }

    #[test]
    fn test_shared_store_sees_grant() {
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        PermissionCache::new(Arc::clone(&store)).mark_granted(Capability::InputMonitoring);
        assert_eq!(store.get_bool("permissions.granted.input_monitoring"), Some(true));
    }

    #[test]
    fn test_grant_outlives_cache_on_same_store() {
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        PermissionCache::new(Arc::clone(&store)).mark_granted(Capability::InputMonitoring);

        // A relaunch builds a fresh cache over the host's store
        let relaunched = PermissionCache::new(store);
        assert!(relaunched.is_granted(Capability::InputMonitoring, false));

        assert!(!cache().is_granted(Capability::InputMonitoring, false));
    }
}
