use std::ffi::CStr;

/// The symbol `addr` falls in, and how far into it.
pub struct Symbol {
    pub name: Option<&'static CStr>,
    pub object: Option<&'static CStr>,
    pub offset: usize,
}

pub fn identify(addr: usize) -> Option<Symbol> {
    unsafe {
        let mut info: libc::Dl_info = std::mem::zeroed();

        // Point inside the call instruction, not after it: a call at the very
        // end of a function would otherwise resolve to the next one.
        if libc::dladdr(addr.saturating_sub(1) as _, &mut info) == 0 {
            return None;
        }

        let name = (!info.dli_sname.is_null()).then(|| CStr::from_ptr(info.dli_sname));
        let object = (!info.dli_fname.is_null()).then(|| CStr::from_ptr(info.dli_fname));
        let base = if info.dli_saddr.is_null() {
            info.dli_fbase
        } else {
            info.dli_saddr
        };

        Some(Symbol {
            name,
            object,
            offset: addr.wrapping_sub(base as usize),
        })
    }
}
