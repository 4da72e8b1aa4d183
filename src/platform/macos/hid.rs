//! Raw keyboard reports through IOKit's HID manager
//!
//! Each subscription runs its own HID manager on a dedicated thread with a
//! CFRunLoop. The C callback receives an integer handle as its context and
//! looks the Rust sink up in a table, so no Rust pointer crosses the FFI
//! boundary.

use std::collections::HashMap;
use std::os::raw::c_void;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use core_foundation::base::{CFRelease, TCFType};
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::number::CFNumber;
use core_foundation::runloop::{kCFRunLoopDefaultMode, CFRunLoop, CFRunLoopRef};
use core_foundation::string::{CFString, CFStringRef};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::hotkey::{HidBackend, HidReport, HidSink, HidSubscription, HotkeyError};

type IOHIDManagerRef = *mut c_void;
type IOHIDValueRef = *mut c_void;
type IOHIDElementRef = *mut c_void;
type IOReturn = i32;

type InputValueCallback =
    extern "C" fn(context: *mut c_void, result: IOReturn, sender: *mut c_void, value: IOHIDValueRef);

const IO_RETURN_SUCCESS: IOReturn = 0;
const IO_RETURN_NOT_PERMITTED: IOReturn = 0xE000_02E2_u32 as i32;
const OPTIONS_NONE: u32 = 0;
const REQUEST_TYPE_LISTEN_EVENT: u32 = 1;
const ACCESS_GRANTED: u32 = 0;

const GENERIC_DESKTOP_PAGE: i32 = 0x01;
const KEYBOARD_USAGE: i32 = 0x06;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const OPEN_TIMEOUT: Duration = Duration::from_secs(2);

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IOHIDManagerCreate(allocator: *const c_void, options: u32) -> IOHIDManagerRef;
    fn IOHIDManagerSetDeviceMatching(manager: IOHIDManagerRef, matching: CFDictionaryRef);
    fn IOHIDManagerRegisterInputValueCallback(
        manager: IOHIDManagerRef,
        callback: Option<InputValueCallback>,
        context: *mut c_void,
    );
    fn IOHIDManagerScheduleWithRunLoop(
        manager: IOHIDManagerRef,
        run_loop: CFRunLoopRef,
        mode: CFStringRef,
    );
    fn IOHIDManagerUnscheduleFromRunLoop(
        manager: IOHIDManagerRef,
        run_loop: CFRunLoopRef,
        mode: CFStringRef,
    );
    fn IOHIDManagerOpen(manager: IOHIDManagerRef, options: u32) -> IOReturn;
    fn IOHIDManagerClose(manager: IOHIDManagerRef, options: u32) -> IOReturn;
    fn IOHIDValueGetElement(value: IOHIDValueRef) -> IOHIDElementRef;
    fn IOHIDValueGetIntegerValue(value: IOHIDValueRef) -> isize;
    fn IOHIDElementGetUsagePage(element: IOHIDElementRef) -> u32;
    fn IOHIDElementGetUsage(element: IOHIDElementRef) -> u32;
    fn IOHIDCheckAccess(request_type: u32) -> u32;
}

/// Live sinks keyed by the handle passed as callback context
static SINKS: Lazy<Mutex<HashMap<usize, HidSink>>> = Lazy::new(|| Mutex::new(HashMap::new()));
static NEXT_HANDLE: AtomicUsize = AtomicUsize::new(1);

extern "C" fn input_value_callback(
    context: *mut c_void,
    _result: IOReturn,
    _sender: *mut c_void,
    value: IOHIDValueRef,
) {
    if value.is_null() {
        return;
    }
    let handle = context as usize;
    let Some(sink) = SINKS.lock().get(&handle).cloned() else {
        return;
    };
    let report = unsafe {
        let element = IOHIDValueGetElement(value);
        if element.is_null() {
            return;
        }
        HidReport {
            usage_page: IOHIDElementGetUsagePage(element),
            usage: IOHIDElementGetUsage(element),
            value: IOHIDValueGetIntegerValue(value) as i64,
        }
    };
    sink(report);
}

/// Keyboard reports for every attached keyboard
pub struct IoHidKeyboard;

impl HidBackend for IoHidKeyboard {
    fn open(&self, sink: HidSink) -> Result<Box<dyn HidSubscription>, HotkeyError> {
        let handle = NEXT_HANDLE.fetch_add(1, Ordering::SeqCst);
        SINKS.lock().insert(handle, sink);

        let running = Arc::new(AtomicBool::new(true));
        let (opened_tx, opened_rx) = mpsc::sync_channel::<Result<(), HotkeyError>>(1);

        let thread_running = Arc::clone(&running);
        let spawned = thread::Builder::new()
            .name("hid-keyboard".to_string())
            .spawn(move || {
                run_manager(handle, thread_running, opened_tx);
                SINKS.lock().remove(&handle);
            });
        if let Err(e) = spawned {
            SINKS.lock().remove(&handle);
            return Err(HotkeyError::ThreadSpawn(e.to_string()));
        }

        let opened = opened_rx
            .recv_timeout(OPEN_TIMEOUT)
            .unwrap_or_else(|_| Err(HotkeyError::Unavailable("HID manager did not start".into())));
        match opened {
            Ok(()) => Ok(Box::new(HidThreadSubscription { running })),
            Err(e) => {
                running.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    fn check_access(&self) -> bool {
        unsafe { IOHIDCheckAccess(REQUEST_TYPE_LISTEN_EVENT) == ACCESS_GRANTED }
    }
}

struct HidThreadSubscription {
    running: Arc<AtomicBool>,
}

impl HidSubscription for HidThreadSubscription {
    fn close(self: Box<Self>) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Drop for HidThreadSubscription {
    fn drop(&mut self) {
        // The run loop thread notices within one poll interval
        self.running.store(false, Ordering::SeqCst);
    }
}

fn keyboard_matching() -> CFDictionary<CFString, CFNumber> {
    CFDictionary::from_CFType_pairs(&[
        (
            CFString::new("DeviceUsagePage"),
            CFNumber::from(GENERIC_DESKTOP_PAGE),
        ),
        (CFString::new("DeviceUsage"), CFNumber::from(KEYBOARD_USAGE)),
    ])
}

/// Body of the HID thread: open, report the outcome, then pump the run loop
fn run_manager(
    handle: usize,
    running: Arc<AtomicBool>,
    opened: mpsc::SyncSender<Result<(), HotkeyError>>,
) {
    let manager = unsafe { IOHIDManagerCreate(std::ptr::null(), OPTIONS_NONE) };
    if manager.is_null() {
        let _ = opened.send(Err(HotkeyError::Unavailable(
            "IOHIDManagerCreate returned null".into(),
        )));
        return;
    }

    let matching = keyboard_matching();
    let run_loop = CFRunLoop::get_current();
    let status = unsafe {
        IOHIDManagerSetDeviceMatching(manager, matching.as_concrete_TypeRef());
        IOHIDManagerRegisterInputValueCallback(
            manager,
            Some(input_value_callback),
            handle as *mut c_void,
        );
        IOHIDManagerScheduleWithRunLoop(
            manager,
            run_loop.as_concrete_TypeRef(),
            kCFRunLoopDefaultMode,
        );
        IOHIDManagerOpen(manager, OPTIONS_NONE)
    };

    if status != IO_RETURN_SUCCESS {
        let err = if status == IO_RETURN_NOT_PERMITTED {
            HotkeyError::PermissionDenied
        } else {
            HotkeyError::Unavailable(format!("IOHIDManagerOpen returned {status:#x}"))
        };
        warn!(handle, error = %err, "HID manager open failed");
        unsafe {
            IOHIDManagerUnscheduleFromRunLoop(
                manager,
                run_loop.as_concrete_TypeRef(),
                kCFRunLoopDefaultMode,
            );
            CFRelease(manager as *const c_void);
        }
        let _ = opened.send(Err(err));
        return;
    }

    info!(handle, "HID keyboard manager opened");
    if opened.send(Ok(())).is_err() {
        // Caller gave up waiting
        running.store(false, Ordering::SeqCst);
    }

    while running.load(Ordering::SeqCst) {
        unsafe {
            CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, POLL_INTERVAL, true);
        }
    }

    unsafe {
        if IOHIDManagerClose(manager, OPTIONS_NONE) != IO_RETURN_SUCCESS {
            error!(handle, "HID manager close failed");
        }
        IOHIDManagerUnscheduleFromRunLoop(
            manager,
            run_loop.as_concrete_TypeRef(),
            kCFRunLoopDefaultMode,
        );
        CFRelease(manager as *const c_void);
    }
    debug!(handle, "HID keyboard manager closed");
}
