//! Frame pointer walker.


#[cfg(feature = "trace-walk")]
use tracing::instrument;

use crate::arch::{self, RETURN_ADDRESS_SLOT, SAVED_FRAME_POINTER_SLOT};
use crate::{Addr, AddressBounds};

/// Why a walk ended before or at the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(feature = "trace-walk"), allow(dead_code))]
pub(crate) enum Stop {
    /// Every slot was filled. The stack may go deeper.
    Exhausted,
    /// The next frame record address failed the frame guard.
    UntrustedFrame(Addr),
    /// The frame record looked fine but the return address in it did not.
    UntrustedReturnAddress(Addr),
}

/// Captures the return addresses of the caller's ancestors into `buffer`,
/// innermost first, and returns how many were written.
///
/// `buffer[0]` is where the caller of `capture` will return to, so the
/// caller's own frame is the first one walked and `capture` itself never
/// shows up. The walk stops early, without error, at the first frame it does
/// not trust; any count including 0 is a valid trace. A count equal to
/// `buffer.len()` means deeper frames may have been cut off.
///
/// Never allocates, blocks or writes to the stack it reads. Logs nothing
/// unless the `trace-walk` feature is on.
///
/// # Build requirement
///
/// Every function on the walked stack must keep a frame pointer
/// (`-C force-frame-pointers=yes`). Frames built without one make the walk
/// return 0 or a bogus trace.
#[inline(never)]
pub fn capture(buffer: &mut [usize]) -> usize {
    capture_here(buffer, &AddressBounds::NATIVE)
}

/// [`capture`] with address bounds other than [`AddressBounds::NATIVE`].
#[inline(never)]
pub fn capture_with(buffer: &mut [usize], bounds: &AddressBounds) -> usize {
    capture_here(buffer, bounds)
}

/// The frame record of the function this is inlined into, if it passes the
/// frame guard.
#[inline(always)]
pub(crate) fn own_frame(bounds: &AddressBounds) -> Option<Addr> {
    let own = arch::frame_pointer();
    if !bounds.is_plausible_frame(own.addr()) {
        #[cfg(feature = "trace-walk")]
        trace!(frame = ?own, "own frame pointer is implausible, built without frame pointers?");
        return None;
    }
    Some(own)
}

/// Starts the walk at the frame pointer register of the function this is
/// inlined into, skipping that function's own frame.
#[inline(always)]
pub(crate) fn capture_here(buffer: &mut [usize], bounds: &AddressBounds) -> usize {
    if buffer.is_empty() {
        return 0;
    }
    let Some(own) = own_frame(bounds) else {
        return 0;
    };

    // SAFETY: `own` is the live frame pointer register of the entry point,
    // which is built with a frame pointer, so its record is on this stack.
    let caller = unsafe { own.read_word(SAVED_FRAME_POINTER_SLOT) };

    // SAFETY: the caller's frame record was pushed by code that keeps frame
    // pointers, which is the documented requirement of every entry point.
    unsafe { capture_from(caller, buffer, bounds) }
}

/// Walks the frame pointer chain starting at the frame record at `frame`,
/// e.g. the frame pointer saved in a signal context.
///
/// `buffer[0]` receives the return address stored in `frame` itself. Returns
/// the number of addresses written, see [`capture`].
///
/// # Safety
///
/// Every address on the chain that passes the frame guard of `bounds` must be
/// readable for two words. This holds when every frame on the chain was
/// built with a frame pointer.
#[cfg_attr(
    feature = "trace-walk",
    instrument(level = "trace", skip(buffer, bounds), fields(capacity = buffer.len()))
)]
pub unsafe fn capture_from(frame: usize, buffer: &mut [usize], bounds: &AddressBounds) -> usize {
    let (count, stop) = unsafe { walk(Addr::from_addr(frame), buffer, bounds) };

    #[cfg(feature = "trace-walk")]
    log_stop(count, stop);
    #[cfg(not(feature = "trace-walk"))]
    let _ = stop;

    count
}

#[cfg(feature = "trace-walk")]
fn log_stop(count: usize, stop: Stop) {
    match stop {
        Stop::Exhausted => trace!(captured = count, "buffer full, trace may be truncated"),
        Stop::UntrustedFrame(frame) => {
            trace!(depth = count, ?frame, "untrusted frame pointer, stopping")
        }
        Stop::UntrustedReturnAddress(return_address) => {
            trace!(depth = count, ?return_address, "untrusted return address, stopping")
        }
    }
}

/// The walk proper. Each frame address is checked before anything is read
/// from it, and each return address is checked before it is stored.
///
/// # Safety
///
/// See [`capture_from`].
pub(crate) unsafe fn walk(
    mut frame: Addr,
    buffer: &mut [usize],
    bounds: &AddressBounds,
) -> (usize, Stop) {
    for depth in 0..buffer.len() {
        if depth > 0 {
            // SAFETY: `frame` passed the frame guard on the previous iteration.
            frame = Addr::from_addr(unsafe { frame.read_word(SAVED_FRAME_POINTER_SLOT) });
        }

        if !bounds.is_plausible_frame(frame.addr()) {
            return (depth, Stop::UntrustedFrame(frame));
        }

        // SAFETY: plausible frame, readable per the contract of `capture_from`.
        let return_address = unsafe { frame.read_word(RETURN_ADDRESS_SLOT) };
        if !bounds.is_plausible_return_address(return_address) {
            return (depth, Stop::UntrustedReturnAddress(Addr::from_addr(return_address)));
        }

        buffer[depth] = return_address;
    }

    (buffer.len(), Stop::Exhausted)
}
