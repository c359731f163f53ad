//! Regular file copying

use super::{buffer_len, Obfuscator};
use crate::attr::AttributeStore;
use crate::error::{Error, Result};
use crate::report::Verbosity;
use crate::sequence::scratch_buffer;
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::os::unix::fs::FileExt;
use std::path::Path;
use tracing::info;

impl<S: AttributeStore> Obfuscator<S> {
    /// Create `dest_dir/dest_name` as an obfuscated copy of `source`
    ///
    /// Fails rather than overwrite an existing entry. The source content is
    /// only read when data dumps are enabled.
    pub fn obfuscate_file(&mut self, source: &Path, dest_dir: &Path, dest_name: &str) -> Result<()> {
        let source_file = File::open(source).map_err(|e| Error::fs("open", source, e))?;

        let dest = dest_dir.join(dest_name);
        let dest_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest)
            .map_err(|e| Error::fs("create file", &dest, e))?;

        self.obfuscate_attributes(source, &dest)?;

        let source_len = source_file
            .metadata()
            .map_err(|e| Error::fs("stat", source, e))?
            .len();
        let (len, truncated) = self.config.limits.clamp(source_len);

        if self.verbosity >= Verbosity::Files {
            info!(
                "File {:?} -> {:?}, {} bytes{}",
                source,
                dest,
                len,
                if truncated { " (truncated)" } else { "" }
            );
        }

        if truncated {
            self.stats.truncated += 1;
        }
        if len == 0 {
            self.stats.files += 1;
            return Ok(());
        }

        let size = buffer_len(len)?;

        if let Some(limit) = self.verbosity.dump_limit(self.config.dump.preview_bytes) {
            let mut original = Vec::new();
            (&source_file)
                .take(size.min(limit) as u64)
                .read_to_end(&mut original)
                .map_err(|e| Error::fs("read", source, e))?;
            self.dump("Original content", &original);
        }

        let mut content = scratch_buffer(size)?;
        self.counter.fill(&mut content)?;
        self.dump("Obfuscated content", &content);

        let written = dest_file
            .write_at(&content, 0)
            .map_err(|e| Error::fs("write", &dest, e))?;
        if written != size {
            return Err(Error::ShortWrite {
                path: dest,
                expected: size,
                written,
            });
        }

        self.stats.files += 1;
        self.stats.bytes_written += size as u64;
        Ok(())
    }
}
