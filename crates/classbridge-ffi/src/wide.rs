//! NUL-terminated UTF-16 strings at the boundary

use std::path::PathBuf;

/// Read a NUL-terminated UTF-16 path. Returns `None` for null.
///
/// On Windows the code units become an `OsString` unchanged, so unpaired
/// surrogates survive; elsewhere they are decoded lossily.
///
/// # Safety
///
/// `ptr` must be null or point to a readable sequence of `u16` ending in 0.
pub unsafe fn wide_to_path(ptr: *const u16) -> Option<PathBuf> {
    if ptr.is_null() {
        return None;
    }

    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    let units = std::slice::from_raw_parts(ptr, len);

    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStringExt;
        Some(PathBuf::from(std::ffi::OsString::from_wide(units)))
    }
    #[cfg(not(windows))]
    {
        Some(PathBuf::from(String::from_utf16_lossy(units)))
    }
}

/// Encode `text` into `out`, truncating to leave room for the terminator.
/// `out` must not be empty.
pub(crate) fn write_truncated(text: &str, out: &mut [u16]) {
    let capacity = out.len().saturating_sub(1);
    let mut written = 0;
    for (slot, unit) in out.iter_mut().zip(text.encode_utf16().take(capacity)) {
        *slot = unit;
        written += 1;
    }
    if let Some(terminator) = out.get_mut(written) {
        *terminator = 0;
    }
}
