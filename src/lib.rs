//! # tts-playback
//!
//! Streaming text-to-speech playback core.
//!
//! ## Overview
//!
//! Turns arbitrary article text into audio with minimal time-to-first-sound:
//! - Splits text into synthesis chunks with a short first chunk
//!   ([`chunker`])
//! - Caches synthesized blobs in memory under a byte budget with LRU
//!   eviction ([`cache`])
//! - Overlaps network fetches with playback through a constant two-chunk
//!   look-ahead ([`fetcher`], [`controller`])
//! - Guarantees at most one audible session application-wide ([`manager`])
//! - Handles cancellation and failure without corrupting a later,
//!   unrelated session
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tts_playback::{
//!     AudioCache, AudioManager, CacheConfig, Fetcher, HttpSynthesisClient,
//!     InMemoryUrlRegistry, PlaybackConfig, PlaybackController,
//! };
//! # use tts_playback::AudioOutput;
//!
//! # async fn example(output: Arc<dyn AudioOutput>) -> tts_playback::Result<()> {
//! let registry = Arc::new(InMemoryUrlRegistry::new());
//! let cache = Arc::new(AudioCache::new(CacheConfig::default(), registry));
//! let client = Arc::new(HttpSynthesisClient::new("https://example.com/api/stream_audio"));
//! let fetcher = Arc::new(Fetcher::new(client, cache));
//! let manager = Arc::new(AudioManager::new());
//!
//! let controller =
//!     PlaybackController::new(PlaybackConfig::default(), fetcher, output, manager)?;
//! controller.play("Hello world. This is read aloud.").await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod chunker;
pub mod config;
pub mod controller;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod manager;
pub mod progress;
pub mod synthesis;
pub mod traits;

pub use cache::{AudioCache, CacheConfig, CacheStats};
pub use chunker::{chunk, TextChunk};
pub use config::{ChunkerConfig, PlaybackConfig};
pub use controller::{PlaybackController, PlayerState};
pub use error::{Result, TtsError};
pub use fetcher::Fetcher;
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use manager::{AudioManager, SessionId, StopCallback};
pub use progress::PlaybackProgress;
pub use synthesis::{HttpSynthesisClient, SynthesisClient};
pub use traits::{AudioOutput, BlobUrlRegistry, InMemoryUrlRegistry};
