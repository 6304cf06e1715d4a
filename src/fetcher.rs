//! # Chunk Fetcher
//!
//! Resolves a chunk's audio to a playable url: cache hit, or a cancellable
//! network request that populates the cache on success.
//!
//! Identical in-flight requests are coalesced: when the look-ahead has a
//! fetch for some text already running, an on-demand `resolve` for the same
//! text awaits that fetch instead of issuing a duplicate request, then
//! re-checks the cache. A failed in-flight fetch leaves the cache empty and
//! the on-demand caller retries the network itself, surfacing the error
//! only when playback actually needs the chunk.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::AudioCache;
use crate::error::{Result, TtsError};
use crate::synthesis::SynthesisClient;

/// Cache-or-network resolver for chunk audio.
pub struct Fetcher {
    client: Arc<dyn SynthesisClient>,
    cache: Arc<AudioCache>,
    /// In-flight fetches keyed like the cache. The sender side is dropped
    /// when the owning fetch settles, waking every waiter.
    pending: Mutex<HashMap<String, watch::Receiver<()>>>,
}

impl Fetcher {
    /// Create a fetcher over a synthesis client and the shared audio cache.
    pub fn new(client: Arc<dyn SynthesisClient>, cache: Arc<AudioCache>) -> Self {
        Self {
            client,
            cache,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// The shared cache this fetcher populates.
    pub fn cache(&self) -> &Arc<AudioCache> {
        &self.cache
    }

    /// Whether this text needs no new fetch: already cached, or a fetch for
    /// it is in flight.
    pub fn is_resolved_or_pending(&self, text: &str) -> bool {
        if self.cache.has(text) {
            return true;
        }
        let key = AudioCache::key_for(text);
        self.pending.lock().contains_key(&key)
    }

    /// Resolve chunk text to a playable url.
    ///
    /// Cache hits return without touching the network. Otherwise the fetch
    /// is bound to `cancel`; a fired token yields [`TtsError::Cancelled`],
    /// never a user-facing error.
    pub async fn resolve(&self, text: &str, cancel: &CancellationToken) -> Result<String> {
        let key = AudioCache::key_for(text);

        let tx = loop {
            if let Some(url) = self.cache.get(text) {
                return Ok(url);
            }
            if cancel.is_cancelled() {
                return Err(TtsError::Cancelled);
            }

            // Find-or-register under a single lock acquisition: either
            // adopt the in-flight fetch's receiver, or become the owning
            // fetch. Two resolvers can never both take ownership.
            let mut rx = {
                let mut pending = self.pending.lock();
                match pending.get(&key) {
                    Some(rx) => rx.clone(),
                    None => {
                        let (tx, rx) = watch::channel(());
                        pending.insert(key.clone(), rx);
                        break tx;
                    }
                }
            };

            debug!("Awaiting in-flight fetch for identical chunk text");
            tokio::select! {
                _ = cancel.cancelled() => return Err(TtsError::Cancelled),
                // A closed channel means the owning fetch settled; loop
                // around and re-check the cache.
                _ = rx.changed() => {}
            }
        };

        let result = self.client.synthesize(text, cancel).await;

        // Populate the cache before dropping the sender: a woken waiter's
        // cache check must hit, never refetch. On failure the cache stays
        // empty and waiters retry the network themselves.
        let url = result.map(|payload| self.cache.set(text, payload));
        self.pending.lock().remove(&key);
        drop(tx);
        url
    }

    /// Kick off a fire-and-forget look-ahead fetch.
    ///
    /// Failures on this path are non-fatal by design: they are logged and
    /// discarded, and the chunk is re-fetched on demand once playback
    /// reaches it.
    pub fn spawn_prefetch(self: &Arc<Self>, text: String, cancel: CancellationToken) {
        let fetcher = Arc::clone(self);
        tokio::spawn(async move {
            match fetcher.resolve(&text, &cancel).await {
                Ok(_) => {}
                Err(e) if e.is_cancellation() => {
                    debug!("Look-ahead fetch cancelled");
                }
                Err(e) => {
                    warn!(error = %e, "Look-ahead fetch failed; will retry on demand");
                }
            }
        });
    }
}
