//! Captures run with a subscriber installed on the capturing thread. Without
//! `trace-walk` the walker must never reach it.
#![cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use framewalk::{capture, capture_with, AddressBounds, Frames};
use tracing::{span, Event, Metadata, Subscriber};

/// Counts every span and event it is handed.
struct Counting(Arc<AtomicUsize>);

impl Subscriber for Counting {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
        self.0.fetch_add(1, Ordering::SeqCst);
        span::Id::from_u64(1)
    }

    fn record(&self, _: &span::Id, _: &span::Record<'_>) {}

    fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}

    fn event(&self, _: &Event<'_>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn enter(&self, _: &span::Id) {}

    fn exit(&self, _: &span::Id) {}
}

#[inline(never)]
fn walk_a_little() {
    let mut buffer = [0; 1];
    core::hint::black_box(capture(&mut buffer));

    let trust_nothing = AddressBounds::new(usize::MAX, 0x1000, usize::BITS);
    core::hint::black_box(capture_with(&mut buffer, &trust_nothing));
    core::hint::black_box(Frames::<1>::capture());
}

fn calls_seen_by_subscriber() -> usize {
    let calls = Arc::new(AtomicUsize::new(0));
    tracing::subscriber::with_default(Counting(calls.clone()), walk_a_little);
    calls.load(Ordering::SeqCst)
}

#[test]
#[cfg(not(feature = "trace-walk"))]
fn silent_by_default() {
    assert_eq!(calls_seen_by_subscriber(), 0);
}

#[test]
#[cfg(feature = "trace-walk")]
fn trace_walk_reports_every_walk() {
    // A span and a stop event per walk that gets going, one event for the
    // rejected own frame.
    assert!(calls_seen_by_subscriber() >= 5);
}
