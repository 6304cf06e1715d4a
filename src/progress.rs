//! # Playback Progress
//!
//! Snapshot type published on every progress sample, plus elapsed-time
//! formatting.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Point-in-time playback progress, published on a watch channel while a
/// clip is audible and reset to [`PlaybackProgress::default`] when the
/// session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackProgress {
    /// Fractional progress through the whole session, `0.0..=1.0`.
    ///
    /// Computed chunk-weighted: completed chunks plus the playing clip's
    /// own position/duration fraction, over the chunk count.
    pub fraction: f32,
    /// Formatted elapsed-time label, `m:ss`.
    pub elapsed: String,
    /// Index of the chunk currently playing.
    pub chunk_index: usize,
    /// Total chunks in the session.
    pub chunk_count: usize,
}

impl Default for PlaybackProgress {
    fn default() -> Self {
        Self {
            fraction: 0.0,
            elapsed: format_elapsed(Duration::ZERO),
            chunk_index: 0,
            chunk_count: 0,
        }
    }
}

impl PlaybackProgress {
    /// Progress at the start of a session with `chunk_count` chunks.
    pub(crate) fn start_of(chunk_count: usize) -> Self {
        Self {
            chunk_count,
            ..Self::default()
        }
    }
}

/// Format a duration as a `m:ss` label.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}
