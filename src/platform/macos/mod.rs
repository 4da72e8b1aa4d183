//! macOS system backends

mod hid;
mod pasteboard;
mod pointer;

use core_foundation::runloop::{kCFRunLoopDefaultMode, CFRunLoop};

pub use hid::IoHidKeyboard;
pub use pasteboard::SystemDragPasteboard;
pub use pointer::SystemPointer;

pub fn pump_main_run_loop() {
    unsafe {
        CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, std::time::Duration::ZERO, true);
    }
}
