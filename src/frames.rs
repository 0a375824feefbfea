use core::{fmt, ops::Deref, slice};

use crate::{walk::capture_here, AddressBounds};

/// A trace stored inline, for callers that have no buffer of their own.
///
/// Lives wherever the caller puts it, typically its own stack. Nothing is
/// allocated.
#[derive(Clone)]
pub struct Frames<const N: usize> {
    addrs: [usize; N],
    len: usize,
}

impl<const N: usize> Frames<N> {
    pub const fn new() -> Self {
        Self {
            addrs: [0; N],
            len: 0,
        }
    }

    /// Captures up to `N` return addresses, starting at the return address
    /// of the function calling this. See [`crate::capture`].
    #[inline(never)]
    pub fn capture() -> Self {
        let mut frames = Self::new();
        frames.len = capture_here(&mut frames.addrs, &AddressBounds::NATIVE);
        frames
    }

    #[inline(never)]
    pub fn capture_with(bounds: &AddressBounds) -> Self {
        let mut frames = Self::new();
        frames.len = capture_here(&mut frames.addrs, bounds);
        frames
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.addrs[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// The capture filled every slot, so the stack may have gone deeper.
    pub fn is_truncated(&self) -> bool {
        N > 0 && self.len == N
    }

    pub fn iter(&self) -> slice::Iter<'_, usize> {
        self.as_slice().iter()
    }
}

impl<const N: usize> Default for Frames<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Deref for Frames<N> {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        self.as_slice()
    }
}

impl<'a, const N: usize> IntoIterator for &'a Frames<N> {
    type Item = &'a usize;
    type IntoIter = slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const N: usize> fmt::Debug for Frames<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|addr| *addr as *const ()))
            .finish()
    }
}

impl<const N: usize> PartialEq for Frames<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<const N: usize> Eq for Frames<N> {}
