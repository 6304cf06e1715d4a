//! Cache configuration

use serde::{Deserialize, Serialize};

/// Configuration for the audio blob cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum total payload size in bytes (default: 50 MiB).
    ///
    /// Eviction removes least-recently-accessed entries one at a time until
    /// a new insert fits.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

impl CacheConfig {
    /// Create a cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the byte budget.
    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_bytes == 0 {
            return Err("max_bytes must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_max_bytes() -> u64 {
    50 * 1024 * 1024
}
