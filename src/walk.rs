//! Walks the calling thread's own stack along the frame pointer chain.
//!
//! The walk is heuristic: it cannot know where the stack ends, so it stops at
//! the first frame pointer or return address that does not look like one (see
//! [`AddressBounds`](crate::AddressBounds)). A short trace is a normal result,
//! never an error.

mod fp;

pub use fp::{capture, capture_from, capture_with};

pub(crate) use fp::{capture_here, own_frame};
