//! Sequence numbers and the buffer filler built on them
//!
//! Every obfuscated name, attribute value and file body is produced here:
//! the buffer is filled with ASCII `'0'` and the trailing bytes receive the
//! next sequence value, rendered as a zero-padded decimal number of
//! [`RENDER_WIDTH`] digits. Buffers shorter than the rendering keep only its
//! low-order digits.

use crate::error::{Error, Result};

/// Digits in the zero-padded rendering of a sequence value
pub const RENDER_WIDTH: usize = 23;

/// Process-wide source of uniqueness
///
/// Hands out 0, 1, 2, ... and never repeats a value. One counter is shared by
/// every obfuscation step of a run, so the order of calls is observable in
/// the output.
#[derive(Debug)]
pub struct SequenceCounter {
    /// Value returned by the next call, `None` once `u64::MAX` was handed out
    next: Option<u64>,
}

impl SequenceCounter {
    /// Create a counter starting at zero
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a counter whose first value is `value`
    pub fn starting_at(value: u64) -> Self {
        SequenceCounter { next: Some(value) }
    }

    /// Value the next call will return, if any remain
    pub fn peek(&self) -> Option<u64> {
        self.next
    }

    /// Return the current value and advance by one
    pub fn next(&mut self) -> Result<u64> {
        let value = self.next.ok_or(Error::SequenceExhausted)?;
        self.next = value.checked_add(1);
        Ok(value)
    }

    /// Overwrite `buf` with the next sequence value
    ///
    /// Returns the value consumed. An empty buffer is rejected without
    /// consuming anything.
    pub fn fill(&mut self, buf: &mut [u8]) -> Result<u64> {
        if buf.is_empty() {
            return Err(Error::InvalidArgument(
                "cannot obfuscate a zero-length buffer".to_string(),
            ));
        }

        let value = self.next()?;
        buf.fill(b'0');

        // Right-justified; digits past RENDER_WIDTH would always be padding.
        let mut remaining = value;
        for slot in buf.iter_mut().rev().take(RENDER_WIDTH) {
            *slot = b'0' + (remaining % 10) as u8;
            remaining /= 10;
            if remaining == 0 {
                break;
            }
        }

        Ok(value)
    }

    /// Allocate a buffer of `size` bytes and fill it
    pub fn obfuscate_buffer(&mut self, size: usize) -> Result<Vec<u8>> {
        if size == 0 {
            return Err(Error::InvalidArgument(
                "cannot obfuscate a zero-length buffer".to_string(),
            ));
        }
        let mut buf = scratch_buffer(size)?;
        self.fill(&mut buf)?;
        Ok(buf)
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocate a zeroed scratch buffer, reporting failure instead of aborting
pub fn scratch_buffer(size: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| Error::OutOfMemory { size })?;
    buf.resize(size, 0);
    Ok(buf)
}
