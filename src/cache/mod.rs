//! # Audio Cache Module
//!
//! In-memory, size-bounded LRU store for synthesized audio blobs.
//!
//! ## Overview
//!
//! Synthesizing a chunk costs a network round trip; replaying one should
//! not. The cache keys blobs by the normalized chunk text itself, so two
//! sessions reading identical text share one entry, and it owns the
//! playable urls minted for those blobs: each url is revoked exactly once,
//! at eviction, explicit clear, or cache drop.
//!
//! There is no time-based expiry. Entries live until evicted under byte
//! pressure or explicitly cleared; this is a deliberate, distinct policy
//! from any TTL-based content caches a host application may run elsewhere.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     AudioCache                         │
//! │  - get() / set() / has() / clear()     │
//! │  - LRU eviction under byte budget      │
//! └────────┬───────────────────────────────┘
//!          │
//!          └──> BlobUrlRegistry (url mint/revoke)
//! ```

pub mod config;
pub mod stats;
pub mod store;

pub use config::CacheConfig;
pub use stats::CacheStats;
pub use store::AudioCache;
