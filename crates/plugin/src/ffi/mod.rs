//! C-compatible exports
//!
//! Handlers report what the engine should do with the triggering action
//! as one of the `OUTCOME_*` codes. A rewrite copies the new text,
//! NUL-terminated, into the caller's buffer. A faulted callback is
//! reported as a block.

mod exports;

pub use exports::*;

use std::borrow::Cow;
use std::ffi::{c_char, c_int, CStr};

use qlrust_core::Outcome;

/// Let the action happen unchanged
pub const OUTCOME_ALLOW: c_int = 0;
/// Suppress the action
pub const OUTCOME_BLOCK: c_int = 1;
/// Use the text written to the output buffer instead
pub const OUTCOME_REWRITTEN: c_int = 2;

/// Borrow a C string, replacing invalid UTF-8
///
/// # Safety
/// `ptr` must be null or a valid NUL-terminated string.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::Borrowed("")
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

/// Copy `text` into a C buffer, NUL-terminated. Returns false if it does
/// not fit.
///
/// # Safety
/// `out` must be null or valid for `maxlen` bytes.
pub(crate) unsafe fn write_c_buffer(out: *mut c_char, maxlen: usize, text: &str) -> bool {
    if out.is_null() || text.len() >= maxlen {
        return false;
    }
    std::ptr::copy_nonoverlapping(text.as_ptr(), out as *mut u8, text.len());
    *out.add(text.len()) = 0;
    true
}

/// Helper to write an error message to a C buffer, truncating it
///
/// # Safety
/// - `error` must be a valid pointer or null
/// - `maxlen` must accurately reflect the buffer size
pub(crate) unsafe fn write_error(error: *mut c_char, maxlen: usize, msg: &str) {
    if !error.is_null() && maxlen > 0 {
        let bytes = msg.as_bytes();
        let len = bytes.len().min(maxlen - 1);
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), error as *mut u8, len);
        *error.add(len) = 0;
    }
}

/// Translate an outcome, writing rewritten text to `out`
///
/// # Safety
/// `out` must be null or valid for `maxlen` bytes.
pub(crate) unsafe fn outcome_code(outcome: Outcome, out: *mut c_char, maxlen: usize) -> c_int {
    match outcome {
        Outcome::Allow => OUTCOME_ALLOW,
        // The core already logged the fault; the engine must not act on it
        Outcome::Block | Outcome::Faulted => OUTCOME_BLOCK,
        Outcome::Rewrite(text) => {
            if write_c_buffer(out, maxlen, &text) {
                OUTCOME_REWRITTEN
            } else {
                tracing::warn!(
                    "Rewritten text of {} bytes does not fit a {} byte buffer; keeping the original",
                    text.len(),
                    maxlen
                );
                OUTCOME_ALLOW
            }
        }
    }
}

/// Translate an outcome for a callback that cannot rewrite
pub(crate) fn status_code(outcome: Outcome) -> c_int {
    // SAFETY: a null buffer is never written
    unsafe { outcome_code(outcome, std::ptr::null_mut(), 0) }
}
