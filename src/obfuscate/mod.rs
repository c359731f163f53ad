//! Obfuscating tree copy
//!
//! [`Obfuscator`] walks a source tree depth-first and recreates it under a
//! destination directory. Names, attribute values and file contents are
//! replaced by sequence numbers of the same length; attribute names, types
//! and the tree's shape are kept. The first failure aborts the whole walk.

mod attributes;
mod directory;
mod file;

pub use directory::EntryKind;

use crate::attr::{AttributeStore, XattrStore};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::report::{hex_dump, Verbosity};
use crate::sequence::SequenceCounter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Totals for one or more runs of an [`Obfuscator`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub directories: u64,
    pub files: u64,
    pub attributes: u64,
    pub skipped_symlinks: u64,
    pub skipped_other: u64,
    /// Attribute values and file bodies cut down to the truncation cap
    pub truncated: u64,
    /// File content bytes written, attributes excluded
    pub bytes_written: u64,
}

/// Shared state of an obfuscation run
///
/// Owns the single sequence counter every name, attribute and file draws
/// from. Reusing one instance for several trees continues the sequence.
pub struct Obfuscator<S = XattrStore> {
    counter: SequenceCounter,
    config: Config,
    store: S,
    verbosity: Verbosity,
    stats: Stats,
}

impl Obfuscator<XattrStore> {
    /// Create an obfuscator working on real extended attributes
    pub fn new(config: Config) -> Self {
        Self::with_store(config, XattrStore::new())
    }
}

impl<S: AttributeStore> Obfuscator<S> {
    /// Create an obfuscator over a custom attribute store
    pub fn with_store(config: Config, store: S) -> Self {
        Obfuscator {
            counter: SequenceCounter::new(),
            config,
            store,
            verbosity: Verbosity::Quiet,
            stats: Stats::default(),
        }
    }

    /// Replace the sequence counter, e.g. to continue an earlier numbering
    pub fn with_counter(mut self, counter: SequenceCounter) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn counter(&self) -> &SequenceCounter {
        &self.counter
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Copy `input` into `output`, creating `output` if needed
    ///
    /// `input` must be a directory and `output` must not lie inside it.
    pub fn obfuscate_tree(&mut self, input: &Path, output: &Path) -> Result<()> {
        let meta = fs::metadata(input).map_err(|e| Error::fs("read", input, e))?;
        if !meta.is_dir() {
            return Err(Error::Usage(format!(
                "\"{}\" is not a directory",
                input.display()
            )));
        }

        let input_real = fs::canonicalize(input).map_err(|e| Error::fs("resolve", input, e))?;
        if resolve_partial(output)?.starts_with(&input_real) {
            return Err(Error::Usage(format!(
                "output \"{}\" is inside input \"{}\"",
                output.display(),
                input.display()
            )));
        }

        fs::create_dir_all(output).map_err(|e| Error::fs("create directory", output, e))?;

        info!("Obfuscating {:?} into {:?}", input, output);
        self.obfuscate_directory(input, output)
    }

    /// Log a dump of `bytes` when the verbosity asks for data
    fn dump(&self, label: &str, bytes: &[u8]) {
        if let Some(limit) = self.verbosity.dump_limit(self.config.dump.preview_bytes) {
            info!("{} ({} bytes):\n{}", label, bytes.len(), hex_dump(bytes, limit));
        }
    }
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest
fn resolve_partial(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        match fs::canonicalize(existing) {
            Ok(real) => {
                return Ok(missing.iter().rev().fold(real, |acc, part| acc.join(part)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(Error::fs("resolve", path, e));
                };
                missing.push(name);
                existing = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            Err(e) => return Err(Error::fs("resolve", path, e)),
        }
    }
}

/// Convert a clamped length to an in-memory buffer size
fn buffer_len(len: u64) -> Result<usize> {
    usize::try_from(len).map_err(|_| Error::OutOfMemory { size: usize::MAX })
}
