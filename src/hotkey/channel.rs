//! Dual-channel global hotkey capture
//!
//! Each registration is installed on the OS hotkey facility (high-level)
//! and, when allowed, on raw HID keyboard reports (low-level). The HID path
//! keeps working under secure input; the high-level path needs no extra
//! permission. Both feed one debounce guard so a single physical press
//! yields a single callback.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backend::{
    HidBackend, HidReport, HidSink, HidSubscription, HighLevelBackend, HighLevelId, HotKeyCallback,
};
use super::debounce::{Debouncer, COOLDOWN};
use super::error::HotkeyError;
use super::low_level::LowLevelMatcher;
use crate::permissions::{Capability, PermissionCache};
use crate::shortcut::Shortcut;
use crate::task::{sleep_unless_cancelled, ScheduledTask};

/// Diagnostic state of one channel for one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// The combination cannot be expressed on this channel
    Unsupported,
    /// Not installed, or installation failed
    Inactive,
    /// Low-level open in progress (retrying)
    Connecting,
    Active,
    /// Open keeps failing but the permission was granted before
    AssumedActive,
}

impl ChannelState {
    pub fn is_active(self) -> bool {
        matches!(self, ChannelState::Active | ChannelState::AssumedActive)
    }
}

/// Snapshot of both channels for a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatus {
    pub high_level: ChannelState,
    pub low_level: ChannelState,
}

impl ChannelStatus {
    /// Registration counts as successful when either channel is up
    pub fn is_active(&self) -> bool {
        self.high_level.is_active() || self.low_level.is_active()
    }
}

/// Which path observed a press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    HighLevel,
    LowLevel,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::HighLevel => write!(f, "high_level"),
            Source::LowLevel => write!(f, "low_level"),
        }
    }
}

/// Low-level open retry schedule
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Delay after attempt `n` is `n * step`
    pub step: Duration,
    /// Background reopen interval while the channel is assumed active
    pub reconnect_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 4,
            step: Duration::from_millis(500),
            reconnect_interval: Duration::from_secs(5),
        }
    }
}

/// Opaque handle returned by [`HotKeyChannel::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotKeyHandle(u64);

#[derive(Default)]
struct LowLevelSlot {
    state: Option<ChannelState>,
    subscription: Option<Box<dyn HidSubscription>>,
    closed: bool,
}

/// State shared with OS callback contexts
struct Registration {
    shortcut: Shortcut,
    matcher: LowLevelMatcher,
    debounce: Debouncer,
    callback: HotKeyCallback,
    high_level: Mutex<ChannelState>,
    low_level: Mutex<LowLevelSlot>,
}

impl Registration {
    fn trigger(&self, source: Source) {
        let now = tokio::time::Instant::now().into_std();
        if self.debounce.try_fire(now) {
            info!(shortcut = %self.shortcut, %source, "hotkey fired");
            (self.callback)();
        } else {
            debug!(shortcut = %self.shortcut, %source, "hotkey debounced");
        }
    }

    fn handle_report(&self, report: HidReport) {
        if self.matcher.handle(report) {
            self.trigger(Source::LowLevel);
        }
    }

    fn status(&self) -> ChannelStatus {
        ChannelStatus {
            high_level: *self.high_level.lock(),
            low_level: self
                .low_level
                .lock()
                .state
                .unwrap_or(ChannelState::Inactive),
        }
    }

    fn set_low_state(&self, state: ChannelState) {
        let mut slot = self.low_level.lock();
        if !slot.closed {
            slot.state = Some(state);
        }
    }

    /// Keep `subscription` unless the registration was torn down meanwhile
    fn install(&self, subscription: Box<dyn HidSubscription>) {
        let mut slot = self.low_level.lock();
        if slot.closed {
            drop(slot);
            subscription.close();
            return;
        }
        slot.state = Some(ChannelState::Active);
        if let Some(previous) = slot.subscription.replace(subscription) {
            previous.close();
        }
    }

    fn close_low_level(&self) {
        let subscription = {
            let mut slot = self.low_level.lock();
            slot.closed = true;
            slot.state = Some(ChannelState::Inactive);
            slot.subscription.take()
        };
        if let Some(subscription) = subscription {
            subscription.close();
        }
    }
}

struct Entry {
    registration: Arc<Registration>,
    high_level_id: Option<HighLevelId>,
    connector: Option<ScheduledTask>,
}

/// Registers global shortcuts on both channels and debounces delivery
pub struct HotKeyChannel {
    high_level: Box<dyn HighLevelBackend>,
    hid: Arc<dyn HidBackend>,
    permissions: PermissionCache,
    retry: RetryPolicy,
    cooldown: Duration,
    next_id: u64,
    entries: HashMap<HotKeyHandle, Entry>,
}

impl HotKeyChannel {
    pub fn new(
        high_level: Box<dyn HighLevelBackend>,
        hid: Arc<dyn HidBackend>,
        permissions: PermissionCache,
    ) -> Self {
        Self {
            high_level,
            hid,
            permissions,
            retry: RetryPolicy::default(),
            cooldown: COOLDOWN,
            next_id: 1,
            entries: HashMap::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Install `shortcut` and invoke `callback` at most once per cooldown
    ///
    /// Channel failures are logged and reflected in [`Self::status`]; this
    /// never fails. Modifier-only shortcuts always use the low-level channel
    /// since they have no other path. Must be called from within a tokio
    /// runtime when the low-level channel is used.
    pub fn register<F>(
        &mut self,
        shortcut: Shortcut,
        allow_low_level_fallback: bool,
        callback: F,
    ) -> HotKeyHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        let handle = HotKeyHandle(self.next_id);
        self.next_id += 1;

        let registration = Arc::new(Registration {
            shortcut,
            matcher: LowLevelMatcher::new(shortcut),
            debounce: Debouncer::new(self.cooldown),
            callback: Arc::new(callback),
            high_level: Mutex::new(ChannelState::Inactive),
            low_level: Mutex::new(LowLevelSlot::default()),
        });

        let high_level_id = self.register_high_level(&registration);

        let use_low_level = allow_low_level_fallback || shortcut.is_modifier_only();
        let connector = if use_low_level {
            registration.set_low_state(ChannelState::Connecting);
            Some(self.spawn_connector(&registration))
        } else {
            None
        };

        info!(
            %shortcut,
            ?handle,
            high_level = ?*registration.high_level.lock(),
            low_level = use_low_level,
            "hotkey registered"
        );

        self.entries.insert(
            handle,
            Entry {
                registration,
                high_level_id,
                connector,
            },
        );
        handle
    }

    /// Tear down both channels; unknown handles are ignored
    pub fn unregister(&mut self, handle: HotKeyHandle) {
        let Some(entry) = self.entries.remove(&handle) else {
            return;
        };
        if let Some(connector) = &entry.connector {
            connector.cancel();
        }
        if let Some(id) = entry.high_level_id {
            self.high_level.unregister(id);
        }
        entry.registration.close_low_level();
        *entry.registration.high_level.lock() = ChannelState::Inactive;
        info!(shortcut = %entry.registration.shortcut, ?handle, "hotkey unregistered");
    }

    pub fn status(&self, handle: HotKeyHandle) -> Option<ChannelStatus> {
        self.entries.get(&handle).map(|e| e.registration.status())
    }

    fn register_high_level(&self, registration: &Arc<Registration>) -> Option<HighLevelId> {
        let shortcut = registration.shortcut;
        if shortcut.is_modifier_only() {
            *registration.high_level.lock() = ChannelState::Unsupported;
            return None;
        }

        let weak: Weak<Registration> = Arc::downgrade(registration);
        let on_press: HotKeyCallback = Arc::new(move || {
            if let Some(registration) = weak.upgrade() {
                registration.trigger(Source::HighLevel);
            }
        });

        match self.high_level.register(shortcut, on_press) {
            Ok(id) => {
                *registration.high_level.lock() = ChannelState::Active;
                Some(id)
            }
            Err(HotkeyError::Unsupported(reason)) => {
                debug!(%shortcut, %reason, "shortcut not representable on high-level channel");
                *registration.high_level.lock() = ChannelState::Unsupported;
                None
            }
            Err(e) => {
                warn!(%shortcut, error = %e, "high-level hotkey registration failed");
                *registration.high_level.lock() = ChannelState::Inactive;
                None
            }
        }
    }

    fn spawn_connector(&self, registration: &Arc<Registration>) -> ScheduledTask {
        let registration = Arc::clone(registration);
        let hid = Arc::clone(&self.hid);
        let permissions = self.permissions.clone();
        let retry = self.retry;
        ScheduledTask::spawn(move |token| {
            connect_low_level(registration, hid, permissions, retry, token)
        })
    }
}

impl Drop for HotKeyChannel {
    fn drop(&mut self) {
        let handles: Vec<HotKeyHandle> = self.entries.keys().copied().collect();
        for handle in handles {
            self.unregister(handle);
        }
    }
}

/// Open the HID channel off the async runtime
///
/// Backends may wait on their own thread while opening, so the call runs on
/// the blocking pool and the sampling loop keeps ticking meanwhile.
async fn open_low_level(
    registration: &Arc<Registration>,
    hid: &Arc<dyn HidBackend>,
) -> Result<Box<dyn HidSubscription>, HotkeyError> {
    let weak = Arc::downgrade(registration);
    let sink: HidSink = Arc::new(move |report| {
        if let Some(registration) = weak.upgrade() {
            registration.handle_report(report);
        }
    });
    let hid = Arc::clone(hid);
    tokio::task::spawn_blocking(move || hid.open(sink))
        .await
        .unwrap_or_else(|e| Err(HotkeyError::Unavailable(format!("HID open task failed: {e}"))))
}

/// Open the HID channel, riding out the permission propagation delay
async fn connect_low_level(
    registration: Arc<Registration>,
    hid: Arc<dyn HidBackend>,
    permissions: PermissionCache,
    retry: RetryPolicy,
    token: CancellationToken,
) {
    let shortcut = registration.shortcut;

    for attempt in 1..=retry.attempts {
        if token.is_cancelled() {
            return;
        }
        match open_low_level(&registration, &hid).await {
            Ok(subscription) => {
                permissions.mark_granted(Capability::InputMonitoring);
                registration.install(subscription);
                info!(%shortcut, attempt, "low-level hotkey channel active");
                return;
            }
            Err(e) => {
                warn!(%shortcut, attempt, error = %e, "low-level hotkey channel open failed");
            }
        }
        if attempt < retry.attempts && !sleep_unless_cancelled(&token, retry.step * attempt).await {
            return;
        }
    }

    if token.is_cancelled() {
        return;
    }
    if !permissions.is_granted(Capability::InputMonitoring, hid.check_access()) {
        warn!(%shortcut, "input monitoring not granted, low-level hotkey channel inactive");
        registration.set_low_state(ChannelState::Inactive);
        return;
    }

    info!(%shortcut, "input monitoring granted earlier, assuming low-level channel active");
    registration.set_low_state(ChannelState::AssumedActive);

    while sleep_unless_cancelled(&token, retry.reconnect_interval).await {
        match open_low_level(&registration, &hid).await {
            Ok(subscription) => {
                registration.install(subscription);
                info!(%shortcut, "low-level hotkey channel reconnected");
                return;
            }
            Err(e) => debug!(%shortcut, error = %e, "low-level reconnect failed"),
        }
    }
}
