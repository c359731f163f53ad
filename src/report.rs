//! Progress reporting levels and data dumps

use std::fmt::Write;

/// How much progress detail to log
///
/// Each level includes everything logged by the levels below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only
    #[default]
    Quiet,
    /// One line per directory
    Directories,
    /// One line per file
    Files,
    /// One line per attribute
    Attributes,
    /// Dumps of values, cut to the configured preview size
    DataPreview,
    /// Complete dumps of values
    DataFull,
}

impl Verbosity {
    /// Map a count of `-v` flags to a level
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Quiet,
            1 => Verbosity::Directories,
            2 => Verbosity::Files,
            3 => Verbosity::Attributes,
            4 => Verbosity::DataPreview,
            _ => Verbosity::DataFull,
        }
    }

    /// Whether values should be dumped at all
    pub fn dumps_data(self) -> bool {
        self >= Verbosity::DataPreview
    }

    /// Number of bytes to dump per value, `None` when dumping is off
    pub fn dump_limit(self, preview_bytes: usize) -> Option<usize> {
        match self {
            Verbosity::DataFull => Some(usize::MAX),
            Verbosity::DataPreview => Some(preview_bytes),
            _ => None,
        }
    }
}

const BYTES_PER_LINE: usize = 16;

/// Render up to `limit` bytes as hex with a printable-character column
pub fn hex_dump(bytes: &[u8], limit: usize) -> String {
    let shown = &bytes[..bytes.len().min(limit)];
    let mut out = String::new();

    for (line, chunk) in shown.chunks(BYTES_PER_LINE).enumerate() {
        let hex = hex::encode(chunk);
        let mut grouped = String::with_capacity(BYTES_PER_LINE * 3);
        for pair in hex.as_bytes().chunks(2) {
            grouped.push(pair[0] as char);
            grouped.push(pair[1] as char);
            grouped.push(' ');
        }

        let text: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();

        let _ = writeln!(
            out,
            "{:08x}  {:<width$} |{}|",
            line * BYTES_PER_LINE,
            grouped,
            text,
            width = BYTES_PER_LINE * 3
        );
    }

    if shown.len() < bytes.len() {
        let _ = writeln!(out, "... {} more bytes", bytes.len() - shown.len());
    }

    out
}
