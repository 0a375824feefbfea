//! Captures the calling thread's call chain as a list of return addresses by
//! following the hardware frame pointer chain.
//!
//! ```ignore
//! let mut buf = [0usize; 32];
//! let n = framewalk::capture(&mut buf);
//! for addr in &buf[..n] {
//!     // hand off to a symbolizer
//! }
//! ```
//!
//! # how it works
//! every function built with a frame pointer starts with a frame record: the
//! caller's frame pointer and the return address, side by side. we read our
//! own frame pointer register and follow the saved links outward. nothing
//! tells us where the chain ends, and code we did not build (JIT output,
//! hand-written assembly) may not keep frame records at all, so before
//! dereferencing anything the address has to look like a stack address, and
//! before storing a return address it has to look like a code address. the
//! first thing that doesn't look right ends the trace.
//!
//! # requirements
//! - x86_64 or aarch64, Linux or another unix. Other architectures build but
//!   always capture 0 frames.
//! - all code on the walked stack must keep frame pointers. this workspace
//!   sets `-C force-frame-pointers=yes` in `.cargo/config.toml`; dependents
//!   need the same. precompiled `std` usually does not, so traces through it
//!   are best-effort.
//! - the walker never allocates, blocks or logs. the `trace-walk` feature
//!   wraps every walk in a `TRACE` span and reports where it stopped; the
//!   subscriber then runs inline on the capturing thread, so keep the feature
//!   off for captures made from signal handlers.

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "trace-walk")]
#[macro_use]
extern crate tracing;

mod arch;
mod bounds;
pub mod execinfo;
mod frames;
mod stdext;
mod walk;

pub use bounds::AddressBounds;
pub use frames::Frames;
pub use walk::{capture, capture_from, capture_with};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Addr(*const ());

impl Addr {
    fn from_addr(addr: usize) -> Self {
        Addr(core::ptr::with_exposed_provenance(addr))
    }

    fn addr(self) -> usize {
        self.0.addr()
    }

    /// Reads the `index`-th word of the record at this address.
    ///
    /// # Safety
    ///
    /// `self + index` words must be readable. Alignment does not matter.
    unsafe fn read_word(self, index: usize) -> usize {
        unsafe { self.0.cast::<usize>().wrapping_add(index).read_unaligned() }
    }
}
