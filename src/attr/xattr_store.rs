//! Attribute store backed by Unix extended attributes

use super::{AttrInfo, AttrType, AttributeStore};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;

/// Extended attributes through the `xattr` crate
///
/// Symlinks are never followed. Unix xattrs have no type tag, so the type is
/// inferred from the value and ignored on write.
#[derive(Debug, Clone, Copy, Default)]
pub struct XattrStore;

impl XattrStore {
    pub fn new() -> Self {
        XattrStore
    }

    /// Infer a type code from raw attribute bytes
    ///
    /// A value is textual when it is UTF-8 with a single trailing NUL.
    pub fn classify(value: &[u8]) -> AttrType {
        match value.split_last() {
            Some((&0, body)) if !body.contains(&0) && std::str::from_utf8(body).is_ok() => {
                AttrType::STRING
            }
            _ => AttrType::RAW,
        }
    }

    fn read_value(path: &Path, name: &OsStr) -> io::Result<Vec<u8>> {
        xattr::get(path, name)?.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("attribute {} disappeared", name.to_string_lossy()),
            )
        })
    }
}

/// Whether an attribute in this namespace may be copied with a made-up value
///
/// Unprivileged Linux callers only see `user.*`. Root also gets `trusted.*`
/// and anything else, except `system.*` (ACLs and similar kernel-managed
/// values) and `security.*`, whose values the kernel or an LSM parses and
/// rejects when they are digits.
pub(crate) fn namespace_permitted(name: &str, is_root: bool) -> bool {
    if is_root {
        !name.starts_with("system.") && !name.starts_with("security.")
    } else {
        name.starts_with("user.")
    }
}

#[cfg(target_os = "linux")]
fn is_permitted(name: &OsStr) -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    let is_root = unsafe { libc::geteuid() } == 0;
    namespace_permitted(&name.to_string_lossy(), is_root)
}

#[cfg(not(target_os = "linux"))]
fn is_permitted(_name: &OsStr) -> bool {
    true
}

impl AttributeStore for XattrStore {
    fn list(&self, path: &Path) -> io::Result<Vec<OsString>> {
        Ok(xattr::list(path)?.filter(|name| is_permitted(name)).collect())
    }

    fn info(&self, path: &Path, name: &OsStr) -> io::Result<AttrInfo> {
        // The xattr crate has no size-only query, so the value is read to be
        // measured and classified. Linux caps a value at 64 KiB (XATTR_SIZE_MAX),
        // well below the truncation cap.
        let value = Self::read_value(path, name)?;
        let size = i64::try_from(value.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "attribute too large"))?;
        Ok(AttrInfo {
            kind: Self::classify(&value),
            size,
        })
    }

    fn read(&self, path: &Path, name: &OsStr, limit: usize) -> io::Result<Vec<u8>> {
        let mut value = Self::read_value(path, name)?;
        value.truncate(limit);
        Ok(value)
    }

    fn write(&self, path: &Path, name: &OsStr, _kind: AttrType, value: &[u8]) -> io::Result<usize> {
        xattr::set(path, name, value)?;
        Ok(value.len())
    }
}

/// Whether `path`'s filesystem accepts `user.*` attributes
#[cfg(test)]
pub(crate) fn xattrs_supported(path: &Path) -> bool {
    let marker = OsStr::new("user.obfustree_check");
    match xattr::set(path, marker, b"1") {
        Ok(()) => {
            let _ = xattr::remove(path, marker);
            true
        }
        Err(_) => false,
    }
}
