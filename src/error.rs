//! Error types for obfustree

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for command-line usage errors (sysexits `EX_USAGE`)
pub const EXIT_USAGE: i32 = 64;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while obfuscating a directory tree
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing command-line arguments
    #[error("Usage error: {0}")]
    Usage(String),

    /// A caller asked for something meaningless, such as a zero-byte buffer
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem failure tied to a specific entry
    #[error("Unable to {context} \"{}\": {source}", path.display())]
    Fs {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem failure on one named attribute
    #[error("Unable to {context} attribute \"{name}\" of \"{}\": {source}", path.display())]
    Attribute {
        context: &'static str,
        path: PathBuf,
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The store reported a negative attribute size
    #[error("Attribute \"{name}\" of \"{}\" reports an impossible size of {size} bytes", path.display())]
    CorruptMetadata {
        path: PathBuf,
        name: String,
        size: i64,
    },

    #[error("Unable to allocate a {size} byte buffer")]
    OutOfMemory { size: usize },

    #[error("Short write to \"{}\": wrote {written} of {expected} bytes", path.display())]
    ShortWrite {
        path: PathBuf,
        expected: usize,
        written: usize,
    },

    /// Every u64 sequence value has been handed out
    #[error("Sequence counter exhausted")]
    SequenceExhausted,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// OS error code behind this error, if any
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Io(source) | Error::Fs { source, .. } | Error::Attribute { source, .. } => {
                source.raw_os_error()
            }
            _ => None,
        }
    }

    /// Build a filesystem error for the given entry
    pub fn fs(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Fs {
            context,
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error
    ///
    /// Filesystem failures surface their errno so scripts can tell a full
    /// disk from a permission problem.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => EXIT_USAGE,
            Error::Io(source) | Error::Fs { source, .. } | Error::Attribute { source, .. } => {
                match source.raw_os_error() {
                    // ENONET shares EX_USAGE's number; no local filesystem call raises it.
                    Some(code) if code > 0 && code != EXIT_USAGE && code <= 255 => code,
                    _ => libc::EIO,
                }
            }
            Error::InvalidArgument(_) | Error::Config(_) | Error::InvalidConfig(_) => libc::EINVAL,
            Error::CorruptMetadata { .. } | Error::ShortWrite { .. } => libc::EIO,
            Error::OutOfMemory { .. } => libc::ENOMEM,
            Error::SequenceExhausted => libc::EOVERFLOW,
        }
    }
}
