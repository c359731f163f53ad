//! Extended attribute access
//!
//! The traversal reads and writes attributes through [`AttributeStore`] so
//! the obfuscation rules do not depend on one platform's xattr API. Each
//! attribute carries a four-character type code; textual types get a NUL
//! terminator after their obfuscated digits.

#[cfg(test)]
pub(crate) mod memory;
mod xattr_store;

pub use xattr_store::XattrStore;

#[cfg(test)]
pub(crate) use xattr_store::xattrs_supported;

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::Path;

/// Four-character attribute type code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttrType(pub u32);

impl AttrType {
    /// NUL-terminated C string
    pub const STRING: AttrType = AttrType::from_code(*b"CSTR");
    /// NUL-terminated MIME type string
    pub const MIME_STRING: AttrType = AttrType::from_code(*b"MIMS");
    /// Untyped bytes
    pub const RAW: AttrType = AttrType::from_code(*b"RAWT");

    /// Build a type from its four characters
    pub const fn from_code(code: [u8; 4]) -> Self {
        AttrType(u32::from_be_bytes(code))
    }

    /// Whether values of this type are NUL-terminated text
    pub fn is_textual(self) -> bool {
        self == Self::STRING || self == Self::MIME_STRING
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.to_be_bytes() {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

/// Type and size of one attribute, as reported by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrInfo {
    pub kind: AttrType,
    /// Signed because stores report sizes the way `stat` does
    pub size: i64,
}

/// Named, typed side values attached to filesystem entries
pub trait AttributeStore {
    /// Attribute names of `path` in enumeration order
    fn list(&self, path: &Path) -> io::Result<Vec<OsString>>;

    /// Type and size of one attribute
    fn info(&self, path: &Path, name: &OsStr) -> io::Result<AttrInfo>;

    /// Up to `limit` leading bytes of one attribute's value
    fn read(&self, path: &Path, name: &OsStr, limit: usize) -> io::Result<Vec<u8>>;

    /// Replace one attribute's value, returning the bytes written
    fn write(&self, path: &Path, name: &OsStr, kind: AttrType, value: &[u8]) -> io::Result<usize>;
}
