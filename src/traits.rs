//! # Platform Seams
//!
//! Abstractions over the host platform's audio primitive and blob-url
//! facility. The playback core never touches a concrete audio device or a
//! browser `URL` object directly; hosts implement these traits and the
//! tests mock them.
//!
//! ## Threading Model
//!
//! Implementations must be `Send + Sync`: the controller drives playback
//! from spawned tokio tasks, and look-ahead prefetches run concurrently
//! with the playing clip.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::Result;

// ============================================================================
// Blob URL Registry
// ============================================================================

/// Mints and revokes playable urls for in-memory audio payloads.
///
/// The [`AudioCache`](crate::cache::AudioCache) is the sole caller and
/// guarantees that every minted url is revoked exactly once, at eviction,
/// explicit clear, or cache drop. Implementations map onto the platform's
/// object-url facility (or keep the bytes addressable in memory).
pub trait BlobUrlRegistry: Send + Sync {
    /// Mint a url addressing `data`. The payload format is opaque.
    fn create_url(&self, data: Bytes) -> String;

    /// Release the resources behind a previously minted url.
    ///
    /// Unknown urls are ignored.
    fn revoke_url(&self, url: &str);
}

/// In-memory [`BlobUrlRegistry`] backed by a map of monotonic urls.
///
/// Suitable for native hosts that resolve urls back to bytes themselves,
/// and for tests that assert revocation discipline.
#[derive(Default)]
pub struct InMemoryUrlRegistry {
    next_id: AtomicU64,
    blobs: Mutex<HashMap<String, Bytes>>,
}

impl InMemoryUrlRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the payload behind a url, if it is still registered.
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.blobs.lock().get(url).cloned()
    }

    /// Number of live (not yet revoked) urls.
    pub fn live_urls(&self) -> usize {
        self.blobs.lock().len()
    }
}

impl BlobUrlRegistry for InMemoryUrlRegistry {
    fn create_url(&self, data: Bytes) -> String {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("blob:mem/{id}");
        self.blobs.lock().insert(url.clone(), data);
        url
    }

    fn revoke_url(&self, url: &str) {
        self.blobs.lock().remove(url);
    }
}

// ============================================================================
// Audio Output
// ============================================================================

/// Platform audio-playback primitive.
///
/// The controller owns at most one live clip at a time: starting a new
/// session replaces rather than accumulates players, so implementations may
/// assume `play` is never called while a previous clip from the same
/// controller is still active.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Play one clip to completion.
    ///
    /// Resolves `Ok(())` when the clip ends naturally, or after [`stop`]
    /// interrupts it.
    ///
    /// # Errors
    ///
    /// Returns an error if the primitive refuses to start or fails
    /// mid-clip (e.g. autoplay policy restrictions, device loss). Such
    /// failures are handled like transport failures by the controller.
    ///
    /// [`stop`]: AudioOutput::stop
    async fn play(&self, url: &str) -> Result<()>;

    /// Stop and reset the active clip, if any.
    async fn stop(&self) -> Result<()>;

    /// Elapsed position within the active clip.
    async fn position(&self) -> Result<Duration>;

    /// Total duration of the active clip, if the payload exposes one.
    async fn duration(&self) -> Result<Option<Duration>>;

    /// Whether a clip is currently audible.
    async fn is_playing(&self) -> Result<bool>;
}
