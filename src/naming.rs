//! Destination name allocation
//!
//! A destination name is a run of digits as long as the source name. When a
//! candidate already exists in the destination directory another sequence
//! value is drawn, and every `attempts_per_length_step` misses the candidate
//! grows by one digit, since short names have few distinct values.

use crate::config::LimitsConfig;
use crate::error::{Error, Result};
use crate::sequence::SequenceCounter;

/// Pick a destination name for a source name of `source_len` bytes
///
/// `exists` reports whether a candidate is already taken. Each attempt
/// consumes one sequence value, rejected ones included. If every attempt
/// collides the last candidate is returned anyway, and creating the entry is
/// left to fail on its own.
pub fn allocate_name<F>(
    counter: &mut SequenceCounter,
    source_len: usize,
    limits: &LimitsConfig,
    mut exists: F,
) -> Result<String>
where
    F: FnMut(&str) -> bool,
{
    let mut candidate = String::new();

    for attempt in 0..limits.collision_attempts {
        let len = candidate_len(source_len, attempt, limits);
        let digits = counter.obfuscate_buffer(len)?;
        candidate = String::from_utf8(digits)
            .map_err(|e| Error::InvalidArgument(format!("non-digit name candidate: {}", e)))?;

        if !exists(&candidate) {
            return Ok(candidate);
        }
    }

    Ok(candidate)
}

/// Length of the candidate generated on attempt `attempt`
fn candidate_len(source_len: usize, attempt: usize, limits: &LimitsConfig) -> usize {
    let grown = source_len.saturating_add(attempt / limits.attempts_per_length_step);
    grown.min(limits.max_name_len)
}
