//! Walks a real `f0 -> f1 -> f2 -> f3` chain. Buffers are never deeper than
//! the frames of this test binary, so the walk never reaches into the
//! precompiled harness.
#![cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]

use framewalk::{capture, capture_with, AddressBounds, Frames};

/// Largest plausible distance from a function's entry to a call site in it.
const MAX_FUNCTION_SIZE: usize = 0x1000;

#[inline(never)]
fn f0(buffer: &mut [usize]) -> usize {
    core::hint::black_box(f1(buffer))
}

#[inline(never)]
fn f1(buffer: &mut [usize]) -> usize {
    core::hint::black_box(f2(buffer))
}

#[inline(never)]
fn f2(buffer: &mut [usize]) -> usize {
    core::hint::black_box(f3(buffer))
}

#[inline(never)]
fn f3(buffer: &mut [usize]) -> usize {
    core::hint::black_box(capture(buffer))
}

fn assert_returns_into(addr: usize, function: usize, name: &str) {
    assert!(
        addr > function && addr - function < MAX_FUNCTION_SIZE,
        "{addr:#x} is not a return site in {name} ({function:#x})"
    );
}

#[test]
fn return_sites_in_caller_order() {
    let mut buffer = [0; 3];

    let count = f0(&mut buffer);

    assert_eq!(count, 3);
    assert_returns_into(buffer[0], f2 as usize, "f2");
    assert_returns_into(buffer[1], f1 as usize, "f1");
    assert_returns_into(buffer[2], f0 as usize, "f0");
}

#[test]
fn reaches_the_test_itself() {
    let mut buffer = [0; 4];

    let count = f0(&mut buffer);

    assert_eq!(count, 4);
    assert_returns_into(buffer[3], reaches_the_test_itself as usize, "the test");
}

#[test]
fn small_buffer_keeps_the_innermost_frames() {
    let mut full = [0; 3];
    let mut small = [0; 2];

    assert_eq!(f0(&mut full), 3);
    assert_eq!(f0(&mut small), 2);

    assert_eq!(small, full[..2]);
}

#[test]
fn empty_buffer() {
    assert_eq!(f0(&mut []), 0);
}

#[inline(never)]
fn g(depth: usize) -> Frames<2> {
    if depth == 0 {
        core::hint::black_box(Frames::capture())
    } else {
        core::hint::black_box(g(depth - 1))
    }
}

#[test]
fn frames_through_recursion() {
    let frames = g(3);

    assert_eq!(frames.len(), 2);
    assert!(frames.is_truncated());
    // Both return sites are the recursive call in `g`.
    assert_eq!(frames[0], frames[1]);
    assert_returns_into(frames[0], g as usize, "g");
}

#[test]
fn concurrent_captures() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                let mut buffer = [0; 3];
                let count = f0(&mut buffer);
                (count, buffer)
            })
        })
        .collect();

    let mut buffer = [0; 3];
    f0(&mut buffer);
    for handle in handles {
        assert_eq!(handle.join().unwrap(), (3, buffer));
    }
}

/// No frame address is at or above `usize::MAX`, so nothing is trusted.
const TRUST_NOTHING: AddressBounds = AddressBounds::new(usize::MAX, 0x1000, usize::BITS);

#[test]
fn custom_bounds_can_reject_everything() {
    let mut buffer = [0; 4];

    assert_eq!(capture_with(&mut buffer, &TRUST_NOTHING), 0);
    assert_eq!(buffer, [0; 4]);

    let frames = Frames::<4>::capture_with(&TRUST_NOTHING);
    assert!(frames.is_empty());
    assert!(!frames.is_truncated());
}

#[inline(never)]
fn with_native_bounds(buffer: &mut [usize]) -> usize {
    core::hint::black_box(capture_with(buffer, &AddressBounds::NATIVE))
}

#[inline(never)]
fn frames_with_native_bounds() -> Frames<1> {
    core::hint::black_box(Frames::capture_with(&AddressBounds::NATIVE))
}

#[test]
fn native_bounds_match_capture() {
    let mut buffer = [0; 1];

    assert_eq!(with_native_bounds(&mut buffer), 1);
    assert_returns_into(buffer[0], native_bounds_match_capture as usize, "the test");

    let frames = frames_with_native_bounds();
    assert_eq!(frames.len(), 1);
    assert_returns_into(frames[0], native_bounds_match_capture as usize, "the test");
}
