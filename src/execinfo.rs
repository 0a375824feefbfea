//! `<execinfo.h>` compatible entry point.
//!
//! With the `export-backtrace` feature, `backtrace` is exported unmangled and
//! takes the place of the libc one, so C code (and crash handlers written
//! against glibc) gets the frame pointer walker instead of the unwinder.

use core::ffi::{c_int, c_void};

use crate::{
    stdext::precondition,
    walk::{capture_from, own_frame},
    AddressBounds,
};

/// Stores up to `size` return addresses into `buffer` and returns how many
/// were stored. Like glibc, `buffer[0]` is the return address of `backtrace`
/// itself, i.e. the call site in the function calling it.
///
/// # Safety
///
/// `buffer` must be valid for writing `size` pointers. Passing a negative
/// `size`, or a null `buffer` with a positive `size`, aborts the process.
/// The build requirement of [`crate::capture`] applies.
#[cfg_attr(feature = "export-backtrace", no_mangle)]
#[inline(never)]
pub unsafe extern "C" fn backtrace(buffer: *mut *mut c_void, size: c_int) -> c_int {
    precondition!(size >= 0, "backtrace called with negative size {size}");
    if size == 0 {
        return 0;
    }
    precondition!(!buffer.is_null(), "backtrace called with null buffer and size {size}");

    // SAFETY: non-null and valid for `size` pointer-sized writes per the
    // contract; `*mut c_void` and `usize` have the same size and alignment.
    let buffer = unsafe { core::slice::from_raw_parts_mut(buffer.cast::<usize>(), size as usize) };

    let bounds = AddressBounds::NATIVE;
    let Some(own) = own_frame(&bounds) else {
        return 0;
    };

    // SAFETY: our own frame record, pushed by code built with frame pointers.
    // Can't exceed `size`, which fits.
    unsafe { capture_from(own.addr(), buffer, &bounds) as c_int }
}
