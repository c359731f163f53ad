//! obfustree - copy a directory tree with its identifying content removed
//!
//! Entry names, extended attribute values and file contents are replaced by
//! sequential numbers rendered as zero-padded digits of the original length.
//! The copy keeps the tree's shape, ordering, attribute names and data sizes,
//! so it can reproduce filesystem bugs without exposing private data.

pub mod attr;
pub mod config;
pub mod error;
pub mod naming;
pub mod obfuscate;
pub mod report;
pub mod sequence;

pub use config::Config;
pub use error::{Error, Result};
pub use obfuscate::{Obfuscator, Stats};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::obfuscate::Obfuscator;
    pub use crate::report::Verbosity;
    pub use crate::sequence::SequenceCounter;
}
