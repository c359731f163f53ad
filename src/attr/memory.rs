//! In-memory attribute store for tests
//!
//! Lets tests declare typed attributes, corrupt sizes and failing writes
//! without depending on the host filesystem's xattr support.

use super::{AttrInfo, AttrType, AttributeStore};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub(crate) struct StoredAttr {
    pub name: OsString,
    pub kind: AttrType,
    /// Reported size, which may disagree with `value`
    pub size: i64,
    pub value: Vec<u8>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    attrs: RefCell<HashMap<PathBuf, Vec<StoredAttr>>>,
    unsupported: RefCell<HashSet<PathBuf>>,
    /// Writes to these paths store only the given number of bytes
    short_writes: RefCell<HashMap<PathBuf, usize>>,
    /// Limits passed to `read`, in call order
    read_limits: RefCell<Vec<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an attribute whose reported size matches its value
    pub fn insert(&self, path: &Path, name: &str, kind: AttrType, value: &[u8]) {
        self.insert_sized(path, name, kind, value.len() as i64, value);
    }

    /// Attach an attribute with an arbitrary reported size
    pub fn insert_sized(&self, path: &Path, name: &str, kind: AttrType, size: i64, value: &[u8]) {
        self.attrs
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_default()
            .push(StoredAttr {
                name: OsString::from(name),
                kind,
                size,
                value: value.to_vec(),
            });
    }

    /// Make listing attributes of `path` fail
    pub fn mark_unsupported(&self, path: &Path) {
        self.unsupported.borrow_mut().insert(path.to_path_buf());
    }

    /// Make writes to `path` store at most `limit` bytes
    pub fn limit_writes(&self, path: &Path, limit: usize) {
        self.short_writes.borrow_mut().insert(path.to_path_buf(), limit);
    }

    /// Limits requested by every `read` so far
    pub fn read_limits(&self) -> Vec<usize> {
        self.read_limits.borrow().clone()
    }

    /// Attributes attached to `path`, in insertion order
    pub fn get(&self, path: &Path) -> Vec<StoredAttr> {
        self.attrs.borrow().get(path).cloned().unwrap_or_default()
    }

    fn find(&self, path: &Path, name: &OsStr) -> io::Result<StoredAttr> {
        self.attrs
            .borrow()
            .get(path)
            .and_then(|attrs| attrs.iter().find(|a| a.name == name).cloned())
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

impl AttributeStore for MemoryStore {
    fn list(&self, path: &Path) -> io::Result<Vec<OsString>> {
        if self.unsupported.borrow().contains(path) {
            return Err(io::Error::from_raw_os_error(libc::EOPNOTSUPP));
        }
        Ok(self.get(path).into_iter().map(|a| a.name).collect())
    }

    fn info(&self, path: &Path, name: &OsStr) -> io::Result<AttrInfo> {
        let attr = self.find(path, name)?;
        Ok(AttrInfo {
            kind: attr.kind,
            size: attr.size,
        })
    }

    fn read(&self, path: &Path, name: &OsStr, limit: usize) -> io::Result<Vec<u8>> {
        self.read_limits.borrow_mut().push(limit);
        let mut value = self.find(path, name)?.value;
        value.truncate(limit);
        Ok(value)
    }

    fn write(&self, path: &Path, name: &OsStr, kind: AttrType, value: &[u8]) -> io::Result<usize> {
        let stored = match self.short_writes.borrow().get(path) {
            Some(&limit) => &value[..value.len().min(limit)],
            None => value,
        };

        let mut attrs = self.attrs.borrow_mut();
        let entry = attrs.entry(path.to_path_buf()).or_default();
        entry.retain(|a| a.name != name);
        entry.push(StoredAttr {
            name: name.to_os_string(),
            kind,
            size: stored.len() as i64,
            value: stored.to_vec(),
        });
        Ok(stored.len())
    }
}
