//! Key/value settings storage supplied by the host application
//!
//! The engine never owns a schema or a file: the host hands in a store
//! (backed by its own preferences) and the engine reads the few keys it
//! needs on demand.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Durable string key/value storage
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.trim() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.set(key, value.to_string());
    }
}

/// In-process store, used by the daemon and by tests
///
/// Nothing survives a restart. Hosts must inject a durable store for the
/// permission cache to remember grants across launches.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.values.lock().remove(key);
    }
}
