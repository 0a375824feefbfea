use crate::arch::layout;

/// Address ranges a frame pointer or return address must fall in to be
/// trusted by the walker.
///
/// These are heuristics, not the real stack and text bounds of the process:
/// they exist to reject garbage cheaply before it is dereferenced. They are
/// specific to the address-space layout of the target, so retune them (or use
/// [`AddressBounds::NATIVE`]) rather than copying literals between platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressBounds {
    /// Lowest address a frame record may live at. Inclusive.
    pub min_frame_address: usize,
    /// Lowest address a return address may point to. Inclusive.
    pub min_code_address: usize,
    /// Width of a user-space virtual address. Every bit at or above this one
    /// must be zero for an address to be canonical.
    pub virtual_address_bits: u32,
}

impl AddressBounds {
    /// Bounds for the compilation target's user-space address layout.
    ///
    /// | target  | address bits | frame floor | code floor |
    /// |---------|--------------|-------------|------------|
    /// | x86_64  | 47           | `0x10000`   | `0x1000`   |
    /// | aarch64 | 48           | `0x10000`   | `0x1000`   |
    /// | other   | `usize::BITS`| `0x10000`   | `0x1000`   |
    pub const NATIVE: Self = Self::new(
        layout::MIN_FRAME_ADDRESS,
        layout::MIN_CODE_ADDRESS,
        layout::VIRTUAL_ADDRESS_BITS,
    );

    /// # Panics
    ///
    /// If `virtual_address_bits` is zero or wider than a pointer.
    pub const fn new(
        min_frame_address: usize,
        min_code_address: usize,
        virtual_address_bits: u32,
    ) -> Self {
        assert!(
            virtual_address_bits > 0 && virtual_address_bits <= usize::BITS,
            "virtual address width must fit in a pointer"
        );
        Self {
            min_frame_address,
            min_code_address,
            virtual_address_bits,
        }
    }

    /// The highest canonical address.
    pub const fn max_address(&self) -> usize {
        usize::MAX >> (usize::BITS - self.virtual_address_bits)
    }

    /// Whether zero-extending the low `virtual_address_bits` of `addr`
    /// gives back `addr`.
    pub const fn is_canonical(&self, addr: usize) -> bool {
        let shift = usize::BITS - self.virtual_address_bits;
        (addr << shift) >> shift == addr
    }

    pub const fn is_plausible_frame(&self, addr: usize) -> bool {
        addr >= self.min_frame_address && self.is_canonical(addr)
    }

    pub const fn is_plausible_return_address(&self, addr: usize) -> bool {
        addr >= self.min_code_address && self.is_canonical(addr)
    }
}

impl Default for AddressBounds {
    fn default() -> Self {
        Self::NATIVE
    }
}
