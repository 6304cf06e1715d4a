//! # Playback Configuration
//!
//! Configuration types for the chunker and the playback controller.
//!
//! All values have sensible defaults; builders exist for the knobs a host
//! application is likely to tune (latency vs. prosody tradeoffs, cooldown).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for text chunking.
///
/// Controls how article text is split into synthesis units. The first chunk
/// is kept deliberately short so that audible playback starts as early as
/// possible; later chunks are longer and close on sentence boundaries for
/// natural prosody.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Maximum input length in characters; longer text is truncated after
    /// normalization.
    ///
    /// Default: 5000 (the synthesis endpoint's own cap).
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Word count of the first chunk. Bounds time-to-first-sound.
    ///
    /// Default: 15.
    #[serde(default = "default_first_chunk_words")]
    pub first_chunk_words: usize,

    /// Target word count for every chunk after the first. A chunk closes
    /// once it reaches this length *and* ends on a sentence terminator.
    ///
    /// Default: 80.
    #[serde(default = "default_target_words")]
    pub target_words: usize,

    /// Words a chunk may grow past `target_words` before it is closed
    /// unconditionally, terminator or not. Keeps chunks bounded on text
    /// with no punctuation.
    ///
    /// Default: 20.
    #[serde(default = "default_overflow_words")]
    pub overflow_words: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
            first_chunk_words: default_first_chunk_words(),
            target_words: default_target_words(),
            overflow_words: default_overflow_words(),
        }
    }
}

impl ChunkerConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_chars == 0 {
            return Err("max_text_chars must be greater than 0".to_string());
        }
        if self.first_chunk_words == 0 {
            return Err("first_chunk_words must be at least 1".to_string());
        }
        if self.target_words < self.first_chunk_words {
            return Err("target_words must not be smaller than first_chunk_words".to_string());
        }
        Ok(())
    }
}

fn default_max_text_chars() -> usize {
    5000
}

fn default_first_chunk_words() -> usize {
    15
}

fn default_target_words() -> usize {
    80
}

fn default_overflow_words() -> usize {
    20
}

/// Configuration for the playback controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Chunking behavior.
    #[serde(default)]
    pub chunker: ChunkerConfig,

    /// Number of chunks kept fetched or in flight ahead of the one playing.
    ///
    /// Default: 2.
    #[serde(default = "default_lookahead_chunks")]
    pub lookahead_chunks: usize,

    /// How long the controller stays in `Error` before automatically
    /// resetting to `Idle`. No retry is attempted during the cooldown; the
    /// reset only re-enables the control for a fresh manual attempt.
    ///
    /// Default: 3 seconds.
    #[serde(default = "default_error_cooldown")]
    pub error_cooldown: Duration,

    /// Interval between progress samples while a clip is playing.
    ///
    /// Default: 100 ms.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            lookahead_chunks: default_lookahead_chunks(),
            error_cooldown: default_error_cooldown(),
            progress_interval: default_progress_interval(),
        }
    }
}

impl PlaybackConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the look-ahead window size.
    pub fn with_lookahead(mut self, chunks: usize) -> Self {
        self.lookahead_chunks = chunks;
        self
    }

    /// Set the error cooldown duration.
    pub fn with_error_cooldown(mut self, cooldown: Duration) -> Self {
        self.error_cooldown = cooldown;
        self
    }

    /// Set the progress sampling interval.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.chunker.validate()?;
        if self.lookahead_chunks == 0 {
            return Err("lookahead_chunks must be at least 1".to_string());
        }
        if self.progress_interval.is_zero() {
            return Err("progress_interval must be non-zero".to_string());
        }
        Ok(())
    }
}

fn default_lookahead_chunks() -> usize {
    2
}

fn default_error_cooldown() -> Duration {
    Duration::from_secs(3)
}

fn default_progress_interval() -> Duration {
    Duration::from_millis(100)
}
