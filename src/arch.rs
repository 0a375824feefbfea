//! Frame pointer register access.
//!
//! On both supported targets a frame record is two words: the caller's saved
//! frame pointer at `[fp]`, and the return address at `[fp + 8]`. On x86_64
//! this is the `push rbp; mov rbp, rsp` prologue; on aarch64 it is the
//! `stp x29, x30, [sp, #-16]!; mov x29, sp` frame record of the AAPCS64.

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use core::arch::asm;

use crate::Addr;

/// Offset in words from a frame record to its saved caller frame pointer.
pub(crate) const SAVED_FRAME_POINTER_SLOT: usize = 0;
/// Offset in words from a frame record to its return address.
pub(crate) const RETURN_ADDRESS_SLOT: usize = 1;

/// Address-space layout of the target, see [`crate::AddressBounds::NATIVE`].
pub(crate) mod layout {
    /// Linux refuses to map anything below `vm.mmap_min_addr`, 64KiB by default.
    pub(crate) const MIN_FRAME_ADDRESS: usize = 0x10000;

    /// The null page.
    pub(crate) const MIN_CODE_ADDRESS: usize = 0x1000;

    #[cfg(target_arch = "x86_64")]
    pub(crate) const VIRTUAL_ADDRESS_BITS: u32 = 47; // lower half of 4-level paging

    #[cfg(target_arch = "aarch64")]
    pub(crate) const VIRTUAL_ADDRESS_BITS: u32 = 48; // TTBR0 range

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    pub(crate) const VIRTUAL_ADDRESS_BITS: u32 = usize::BITS;
}

/// Reads the frame pointer of the function this gets inlined into.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) fn frame_pointer() -> Addr {
    let out: usize;
    unsafe {
        asm!(
            "mov {out}, rbp",
            out = out(reg) out,
            options(nomem, nostack, preserves_flags)
        );
    }
    Addr(core::ptr::with_exposed_provenance(out))
}

/// Reads the frame pointer of the function this gets inlined into.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
pub(crate) fn frame_pointer() -> Addr {
    let out: usize;
    unsafe {
        asm!(
            "mov {out}, x29",
            out = out(reg) out,
            options(nomem, nostack, preserves_flags)
        );
    }
    Addr(core::ptr::with_exposed_provenance(out))
}

/// No frame pointer convention we know of. Null fails every frame guard, so
/// the walk stops before reading anything.
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline(always)]
pub(crate) fn frame_pointer() -> Addr {
    Addr(core::ptr::null())
}
