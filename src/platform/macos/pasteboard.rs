//! The AppKit drag pasteboard

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use objc::rc::autoreleasepool;
use objc::runtime::{Object, BOOL, NO};
use objc::{class, msg_send, sel, sel_impl};

use crate::drag::DragPasteboard;

/// Value of `NSPasteboardNameDrag`
const DRAG_PASTEBOARD_NAME: &str = "Apple CFPasteboard drag";

#[link(name = "AppKit", kind = "framework")]
extern "C" {}

/// Polls `NSPasteboard(name: .drag)`; safe to call from any thread
pub struct SystemDragPasteboard;

impl SystemDragPasteboard {
    /// Shared pasteboard instance (autoreleased; call inside a pool)
    unsafe fn pasteboard() -> *mut Object {
        let Ok(name) = CString::new(DRAG_PASTEBOARD_NAME) else {
            return std::ptr::null_mut();
        };
        let name: *mut Object = msg_send![class!(NSString), stringWithUTF8String: name.as_ptr()];
        msg_send![class!(NSPasteboard), pasteboardWithName: name]
    }
}

impl DragPasteboard for SystemDragPasteboard {
    fn change_count(&self) -> i64 {
        autoreleasepool(|| unsafe {
            let pasteboard = Self::pasteboard();
            if pasteboard.is_null() {
                return 0;
            }
            // NSInteger
            let count: isize = msg_send![pasteboard, changeCount];
            count as i64
        })
    }

    fn types(&self) -> Vec<String> {
        autoreleasepool(|| unsafe {
            let pasteboard = Self::pasteboard();
            if pasteboard.is_null() {
                return Vec::new();
            }
            let types: *mut Object = msg_send![pasteboard, types];
            if types.is_null() {
                return Vec::new();
            }
            let count: usize = msg_send![types, count];
            (0..count)
                .filter_map(|i| {
                    let item: *mut Object = msg_send![types, objectAtIndex: i];
                    let utf8: *const c_char = msg_send![item, UTF8String];
                    (!utf8.is_null()).then(|| CStr::from_ptr(utf8).to_string_lossy().into_owned())
                })
                .collect()
        })
    }

    fn can_read_urls(&self) -> bool {
        autoreleasepool(|| unsafe {
            let pasteboard = Self::pasteboard();
            if pasteboard.is_null() {
                return false;
            }
            let classes: *mut Object = msg_send![class!(NSArray), arrayWithObject: class!(NSURL)];
            let nil: *mut Object = std::ptr::null_mut();
            let readable: BOOL = msg_send![pasteboard, canReadObjectForClasses: classes options: nil];
            readable != NO
        })
    }
}
