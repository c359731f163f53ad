//! Configuration management for obfustree

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest number of bytes of one attribute value or file ever obfuscated
pub const DEFAULT_TRUNCATION_CAP: u64 = 500_000_000;

/// Longest entry name most filesystems accept
pub const DEFAULT_MAX_NAME_LEN: usize = 255;

/// Candidate names tried before accepting a colliding one
pub const DEFAULT_COLLISION_ATTEMPTS: usize = 48;

/// Attempts made at one candidate length before growing it by a digit
pub const DEFAULT_ATTEMPTS_PER_LENGTH_STEP: usize = 8;

/// Bytes shown per data dump at the preview verbosity level
pub const DEFAULT_PREVIEW_BYTES: usize = 320;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Size and naming limits
    pub limits: LimitsConfig,

    /// Diagnostic dump settings
    pub dump: DumpConfig,
}

/// Size and naming limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Values longer than this are cut down to it
    pub truncation_cap: u64,

    /// Maximum destination name length in bytes
    pub max_name_len: usize,

    /// Name candidates generated before giving up on avoiding a collision
    pub collision_attempts: usize,

    /// Candidates per name length
    pub attempts_per_length_step: usize,
}

/// Diagnostic dump settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DumpConfig {
    /// Bytes dumped per value at the preview level
    pub preview_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            truncation_cap: DEFAULT_TRUNCATION_CAP,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            collision_attempts: DEFAULT_COLLISION_ATTEMPTS,
            attempts_per_length_step: DEFAULT_ATTEMPTS_PER_LENGTH_STEP,
        }
    }
}

impl Default for DumpConfig {
    fn default() -> Self {
        DumpConfig {
            preview_bytes: DEFAULT_PREVIEW_BYTES,
        }
    }
}

impl LimitsConfig {
    /// Clamp a source length to the truncation cap
    ///
    /// Returns the clamped length and whether anything was cut off.
    pub fn clamp(&self, len: u64) -> (u64, bool) {
        if len > self.truncation_cap {
            (self.truncation_cap, true)
        } else {
            (len, false)
        }
    }
}

impl Config {
    /// Load configuration from a file, with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(cap) = std::env::var("OBFUSTREE_TRUNCATION_CAP") {
            if let Ok(cap) = cap.trim().parse::<u64>() {
                self.limits.truncation_cap = cap;
            }
        }

        if let Ok(len) = std::env::var("OBFUSTREE_MAX_NAME_LEN") {
            if let Ok(len) = len.trim().parse::<usize>() {
                self.limits.max_name_len = len;
            }
        }
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.limits.truncation_cap == 0 {
            return Err(Error::InvalidConfig(
                "Truncation cap must be greater than 0".to_string(),
            ));
        }

        if usize::try_from(self.limits.truncation_cap).is_err() {
            return Err(Error::InvalidConfig(
                "Truncation cap exceeds addressable memory".to_string(),
            ));
        }

        if self.limits.max_name_len == 0 || self.limits.max_name_len > DEFAULT_MAX_NAME_LEN {
            return Err(Error::InvalidConfig(format!(
                "Maximum name length must be between 1 and {}",
                DEFAULT_MAX_NAME_LEN
            )));
        }

        if self.limits.collision_attempts == 0 {
            return Err(Error::InvalidConfig(
                "At least one name attempt is required".to_string(),
            ));
        }

        if self.limits.attempts_per_length_step == 0 {
            return Err(Error::InvalidConfig(
                "Attempts per length step must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
