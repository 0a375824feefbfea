use core::fmt;
use core::fmt::Write;

/// Writes straight to fd 2. No buffering and no allocation, so it is usable
/// from a signal handler or with a broken allocator.
pub struct LibCStderrWriter;

impl Write for LibCStderrWriter {
    fn write_str(&mut self, mut s: &str) -> fmt::Result {
        while !s.is_empty() {
            let r = unsafe { libc::write(libc::STDERR_FILENO, s.as_ptr().cast(), s.len()) };
            if r < 0 {
                if errno() == libc::EINTR {
                    continue;
                }
                return Err(fmt::Error);
            }
            if r == 0 {
                return Ok(());
            }
            s = &s[(r as usize)..];
        }
        Ok(())
    }
}

pub fn eprint(args: fmt::Arguments<'_>) -> fmt::Result {
    LibCStderrWriter.write_fmt(args)
}

/// Aborts with a message if a caller-side contract does not hold.
///
/// This is for programming errors at the C ABI, where panicking is not an
/// option.
macro_rules! precondition {
    ($cond:expr, $($tt:tt)*) => {
        if !$cond {
            // We separate out the format_args for rust-analyzer support.
            match format_args!($($tt)*) {
                args => {
                    // Nothing useful to do if stderr is gone, we abort either way.
                    let _ = $crate::stdext::eprint(::core::format_args!(
                        "FRAMEWALK PRECONDITION FAILED | framewalk/{}:{}: {}\n",
                        file!(),
                        line!(),
                        args
                    ));
                    $crate::stdext::abort()
                }
            }
        }
    };
}

pub(crate) use precondition;

pub(crate) fn abort() -> ! {
    // SAFETY: We abort.
    unsafe { libc::abort() };
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn errno() -> i32 {
    // SAFETY: errno is thread-local and always valid to read.
    unsafe { *libc::__errno_location() }
}

#[cfg(any(
    target_vendor = "apple",
    target_os = "freebsd",
    target_os = "dragonfly"
))]
fn errno() -> i32 {
    // SAFETY: errno is thread-local and always valid to read.
    unsafe { *libc::__error() }
}

#[cfg(any(target_os = "netbsd", target_os = "openbsd"))]
fn errno() -> i32 {
    // SAFETY: errno is thread-local and always valid to read.
    unsafe { *libc::__errno() }
}

/// Unknown errno location: treat every failed write as final.
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_vendor = "apple",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn errno() -> i32 {
    0
}
