//! Recursive directory walk

use super::Obfuscator;
use crate::attr::AttributeStore;
use crate::error::{Error, Result};
use crate::naming::allocate_name;
use crate::report::Verbosity;
use std::fs;
use std::path::Path;
use tracing::{info, info_span};

/// What a directory entry is, without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    RegularFile,
    Directory,
    Symlink,
    /// Devices, FIFOs, sockets and anything else
    Other,
}

impl From<fs::FileType> for EntryKind {
    fn from(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::RegularFile
        } else {
            EntryKind::Other
        }
    }
}

impl<S: AttributeStore> Obfuscator<S> {
    /// Obfuscate `source`'s attributes onto `dest`, then every entry in it
    ///
    /// `dest` must already exist. Entries are visited in the order the
    /// filesystem lists them; symlinks and special files are skipped.
    pub fn obfuscate_directory(&mut self, source: &Path, dest: &Path) -> Result<()> {
        let _span = info_span!("dir", path = %source.display()).entered();

        if self.verbosity >= Verbosity::Directories {
            info!("Directory {:?} -> {:?}", source, dest);
        }

        self.obfuscate_attributes(source, dest)?;

        let entries = fs::read_dir(source).map_err(|e| Error::fs("read directory", source, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::fs("read directory", source, e))?;
            let source_path = entry.path();
            let kind = EntryKind::from(
                entry
                    .file_type()
                    .map_err(|e| Error::fs("stat", &source_path, e))?,
            );

            let dest_name = allocate_name(
                &mut self.counter,
                entry.file_name().len(),
                &self.config.limits,
                |candidate| dest.join(candidate).symlink_metadata().is_ok(),
            )?;

            match kind {
                EntryKind::RegularFile => {
                    self.obfuscate_file(&source_path, dest, &dest_name)?;
                }
                EntryKind::Directory => {
                    let dest_path = dest.join(&dest_name);
                    fs::create_dir(&dest_path)
                        .map_err(|e| Error::fs("create directory", &dest_path, e))?;
                    self.obfuscate_directory(&source_path, &dest_path)?;
                }
                EntryKind::Symlink => {
                    if self.verbosity >= Verbosity::Files {
                        info!("Skipping symbolic link {:?}", source_path);
                    }
                    self.stats.skipped_symlinks += 1;
                }
                EntryKind::Other => {
                    if self.verbosity >= Verbosity::Files {
                        info!("Skipping special file {:?}", source_path);
                    }
                    self.stats.skipped_other += 1;
                }
            }
        }

        self.stats.directories += 1;
        Ok(())
    }
}
