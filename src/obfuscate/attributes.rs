//! Attribute copying

use super::{buffer_len, Obfuscator};
use crate::attr::AttributeStore;
use crate::error::{Error, Result};
use crate::report::Verbosity;
use crate::sequence::scratch_buffer;
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use tracing::info;

fn attribute_error(context: &'static str, path: &Path, name: &OsStr, source: io::Error) -> Error {
    Error::Attribute {
        context,
        path: path.to_path_buf(),
        name: name.to_string_lossy().into_owned(),
        source,
    }
}

impl<S: AttributeStore> Obfuscator<S> {
    /// Recreate every attribute of `source` on `dest` with obfuscated values
    ///
    /// Names and types are kept. Processing stops at the first failing
    /// attribute.
    pub fn obfuscate_attributes(&mut self, source: &Path, dest: &Path) -> Result<()> {
        let names = self
            .store
            .list(source)
            .map_err(|e| Error::fs("list attributes of", source, e))?;

        for name in &names {
            self.obfuscate_attribute(source, dest, name)?;
        }

        Ok(())
    }

    fn obfuscate_attribute(&mut self, source: &Path, dest: &Path, name: &OsStr) -> Result<()> {
        let info = self
            .store
            .info(source, name)
            .map_err(|e| attribute_error("inspect", source, name, e))?;

        let reported = u64::try_from(info.size).map_err(|_| Error::CorruptMetadata {
            path: source.to_path_buf(),
            name: name.to_string_lossy().into_owned(),
            size: info.size,
        })?;
        let (len, truncated) = self.config.limits.clamp(reported);
        let size = buffer_len(len)?;

        let mut value = scratch_buffer(size)?;

        // Text keeps a terminating NUL so viewers still see a valid string.
        let digits = if info.kind.is_textual() {
            size.saturating_sub(1)
        } else {
            size
        };
        if digits > 0 {
            self.counter.fill(&mut value[..digits])?;
        }
        if digits < size {
            value[digits] = 0;
        }

        if self.verbosity >= Verbosity::Attributes {
            info!(
                "Attribute {:?} type {} size {}{}",
                name,
                info.kind,
                size,
                if truncated { " (truncated)" } else { "" }
            );
        }
        if let Some(limit) = self.verbosity.dump_limit(self.config.dump.preview_bytes) {
            let original = self
                .store
                .read(source, name, size.min(limit))
                .map_err(|e| attribute_error("read", source, name, e))?;
            self.dump("Original value", &original);
            self.dump("Obfuscated value", &value);
        }

        let written = self
            .store
            .write(dest, name, info.kind, &value)
            .map_err(|e| attribute_error("write", dest, name, e))?;
        if written != size {
            return Err(Error::ShortWrite {
                path: dest.to_path_buf(),
                expected: size,
                written,
            });
        }

        self.stats.attributes += 1;
        if truncated {
            self.stats.truncated += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::memory::MemoryStore;
    use crate::attr::AttrType;
    use crate::config::Config;
    use crate::sequence::SequenceCounter;
    use std::path::PathBuf;

    fn paths() -> (PathBuf, PathBuf) {
        (PathBuf::from("/src/node"), PathBuf::from("/dst/node"))
    }

    fn obfuscator() -> Obfuscator<MemoryStore> {
        Obfuscator::with_store(Config::default(), MemoryStore::new())
    }

    #[test]
    fn test_string_attribute_keeps_terminator() {
        let (src, dst) = paths();
        let mut obf = obfuscator().with_counter(SequenceCounter::starting_at(12_345));
        obf.store()
            .insert(&src, "user.subject", AttrType::STRING, b"Hi!!\0");

        obf.obfuscate_attributes(&src, &dst).unwrap();

        let attrs = obf.store().get(&dst);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "user.subject");
        assert_eq!(attrs[0].kind, AttrType::STRING);
        assert_eq!(attrs[0].value, b"2345\0");
        assert_eq!(obf.counter().peek(), Some(12_346));
    }

    #[test]
    fn test_raw_attribute_fully_obfuscated() {
        let (src, dst) = paths();
        let mut obf = obfuscator();
        obf.store()
            .insert(&src, "user.flags", AttrType::RAW, &[0xde, 0xad, 0xbe, 0xef]);

        obf.obfuscate_attributes(&src, &dst).unwrap();

        let attrs = obf.store().get(&dst);
        assert_eq!(attrs[0].value, b"0000");
        assert_eq!(attrs[0].kind, AttrType::RAW);
    }

    #[test]
    fn test_enumeration_order_drives_sequence() {
        let (src, dst) = paths();
        let mut obf = obfuscator();
        obf.store().insert(&src, "user.b", AttrType::RAW, b"xx");
        obf.store().insert(&src, "user.a", AttrType::RAW, b"yy");

        obf.obfuscate_attributes(&src, &dst).unwrap();

        let attrs = obf.store().get(&dst);
        assert_eq!(attrs[0].name, "user.b");
        assert_eq!(attrs[0].value, b"00");
        assert_eq!(attrs[1].name, "user.a");
        assert_eq!(attrs[1].value, b"01");
        assert_eq!(obf.stats().attributes, 2);
    }

    #[test]
    fn test_oversized_attribute_truncated() {
        let (src, dst) = paths();
        let mut config = Config::default();
        config.limits.truncation_cap = 8;
        let mut obf = Obfuscator::with_store(config, MemoryStore::new());
        obf.store()
            .insert(&src, "user.body", AttrType::RAW, &[b'x'; 20]);

        obf.obfuscate_attributes(&src, &dst).unwrap();

        let attrs = obf.store().get(&dst);
        assert_eq!(attrs[0].value.len(), 8);
        assert_eq!(obf.stats().truncated, 1);
    }

    #[test]
    fn test_negative_size_aborts() {
        let (src, dst) = paths();
        let mut obf = obfuscator();
        obf.store()
            .insert_sized(&src, "user.bad", AttrType::RAW, -1, b"");
        obf.store().insert(&src, "user.good", AttrType::RAW, b"ok");

        let err = obf.obfuscate_attributes(&src, &dst).unwrap_err();
        assert!(matches!(err, Error::CorruptMetadata { size: -1, .. }));
        assert!(obf.store().get(&dst).is_empty());
        assert_eq!(obf.counter().peek(), Some(0));
    }

    #[test]
    fn test_empty_values() {
        let (src, dst) = paths();
        let mut obf = obfuscator();
        obf.store().insert(&src, "user.empty", AttrType::RAW, b"");
        obf.store().insert(&src, "user.nul", AttrType::STRING, b"\0");

        obf.obfuscate_attributes(&src, &dst).unwrap();

        let attrs = obf.store().get(&dst);
        assert_eq!(attrs[0].value, b"");
        assert_eq!(attrs[1].value, b"\0");
        assert_eq!(obf.counter().peek(), Some(0));
    }

    #[test]
    fn test_listing_failure() {
        let (src, dst) = paths();
        let mut obf = obfuscator();
        obf.store().mark_unsupported(&src);

        let err = obf.obfuscate_attributes(&src, &dst).unwrap_err();
        assert!(matches!(err, Error::Fs { .. }));
        assert_eq!(err.exit_code(), libc::EOPNOTSUPP);
    }

    #[test]
    fn test_short_write_aborts() {
        let (src, dst) = paths();
        let mut obf = obfuscator();
        obf.store().insert(&src, "user.one", AttrType::RAW, b"abcdef");
        obf.store().insert(&src, "user.two", AttrType::RAW, b"abcdef");
        obf.store().limit_writes(&dst, 3);

        let err = obf.obfuscate_attributes(&src, &dst).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortWrite {
                expected: 6,
                written: 3,
                ..
            }
        ));
        assert_eq!(obf.store().get(&dst).len(), 1);
        assert_eq!(obf.stats().attributes, 0);
    }

    #[test]
    fn test_dump_level_reads_source() {
        let (src, dst) = paths();
        let mut obf = obfuscator().with_verbosity(Verbosity::DataFull);
        obf.store()
            .insert(&src, "user.mime", AttrType::MIME_STRING, b"text/plain\0");

        obf.obfuscate_attributes(&src, &dst).unwrap();

        assert_eq!(obf.store().get(&dst)[0].value, b"0000000000\0");
        assert_eq!(obf.store().read_limits(), vec![11]);
    }

    #[test]
    fn test_preview_read_capped() {
        let (src, dst) = paths();
        let mut config = Config::default();
        config.dump.preview_bytes = 32;
        let mut obf = Obfuscator::with_store(config, MemoryStore::new())
            .with_verbosity(Verbosity::DataPreview);
        obf.store()
            .insert(&src, "user.body", AttrType::RAW, &[b'x'; 400]);

        obf.obfuscate_attributes(&src, &dst).unwrap();

        assert_eq!(obf.store().read_limits(), vec![32]);
        assert_eq!(obf.store().get(&dst)[0].value.len(), 400);
    }

    #[test]
    fn test_no_read_below_dump_levels() {
        let (src, dst) = paths();
        let mut obf = obfuscator().with_verbosity(Verbosity::Attributes);
        obf.store().insert(&src, "user.a", AttrType::RAW, b"secret");

        obf.obfuscate_attributes(&src, &dst).unwrap();

        assert!(obf.store().read_limits().is_empty());
    }
}
