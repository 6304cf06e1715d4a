//! # Playback Error Types
//!
//! Error taxonomy for the streaming TTS playback engine.
//!
//! Cancellation is modeled as an error variant so that every asynchronous
//! path has a single return channel, but it is never surfaced to users:
//! callers are expected to check [`TtsError::is_cancellation`] and discard.

use thiserror::Error;

/// Errors that can occur while resolving or playing synthesized audio.
#[derive(Error, Debug)]
pub enum TtsError {
    // ========================================================================
    // Cancellation
    // ========================================================================
    /// The owning session's cancellation token fired while the operation was
    /// in flight. Silently discarded, never user-facing.
    #[error("Operation cancelled")]
    Cancelled,

    // ========================================================================
    // Synthesis Errors
    // ========================================================================
    /// The synthesis endpoint answered with a non-2xx status.
    #[error("Synthesis request failed with status {status}")]
    Synthesis {
        /// HTTP status code returned by the endpoint.
        status: u16,
    },

    /// Transport-level failure before a response was obtained.
    #[error("Network error: {0}")]
    Network(String),

    // ========================================================================
    // Playback Errors
    // ========================================================================
    /// The audio playback primitive refused to start or failed mid-clip
    /// (e.g. platform policy restrictions). Treated like a transport failure.
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TtsError {
    /// Returns `true` if this error represents a cancelled operation.
    ///
    /// Cancellations must never be shown to the user or drive the controller
    /// into its `Error` state.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TtsError::Cancelled)
    }

    /// Returns `true` if this error is transient and a fresh manual attempt
    /// may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TtsError::Synthesis { .. } | TtsError::Network(_) | TtsError::AudioOutput(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, TtsError>;
