//! # Audio Manager
//!
//! Arbiter guaranteeing at most one audible playback session
//! application-wide, across independent [`PlaybackController`] instances.
//!
//! There is deliberately no hidden global here: the composition root
//! constructs one `AudioManager` and hands an `Arc` to every playback
//! control it creates. "One manager for the whole app" is a property of
//! that wiring, not of a module-level singleton.
//!
//! [`PlaybackController`]: crate::controller::PlaybackController

use parking_lot::Mutex;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Opaque identifier for one playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mint a fresh session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Callback invoked to silence a session that is being preempted.
///
/// Must be cheap, idempotent, and must not call back into the
/// [`AudioManager`] synchronously — it runs under the manager's lock.
/// Cancelling the session's token qualifies; awaiting anything does not.
pub type StopCallback = Box<dyn Fn() + Send + Sync>;

struct ActiveSession {
    id: SessionId,
    stop: StopCallback,
}

/// Registry of the single currently-audible session.
///
/// Acquisition is triggered only by discrete human actions, so the
/// point-in-time semantics of [`is_active`](AudioManager::is_active) are
/// acceptable; this is membership information, not a lock.
#[derive(Default)]
pub struct AudioManager {
    active: Mutex<Option<ActiveSession>>,
}

impl AudioManager {
    /// Create a manager with no active session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` as the audible session.
    ///
    /// If a *different* session is currently registered, its stop callback
    /// is invoked synchronously first, so the old audio is silenced before
    /// the new registration exists. Re-acquiring with the same id just
    /// replaces the callback.
    pub fn acquire(&self, id: SessionId, stop: StopCallback) {
        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            if previous.id != id {
                debug!(preempted = %previous.id, by = %id, "Stopping previously audible session");
                (previous.stop)();
            }
        }
        *active = Some(ActiveSession { id, stop });
    }

    /// Clear the registration, but only if `id` still holds it.
    ///
    /// A superseded session releasing late must not clobber the newer
    /// session's registration.
    pub fn release(&self, id: SessionId) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|a| a.id == id) {
            *active = None;
        }
    }

    /// Whether `id` is the currently registered audible session.
    pub fn is_active(&self, id: SessionId) -> bool {
        self.active.lock().as_ref().is_some_and(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_stop(counter: &Arc<AtomicUsize>) -> StopCallback {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn acquire_preempts_previous_session() {
        let manager = AudioManager::new();
        let stops_a = Arc::new(AtomicUsize::new(0));
        let stops_b = Arc::new(AtomicUsize::new(0));

        let a = SessionId::new();
        let b = SessionId::new();

        manager.acquire(a, counting_stop(&stops_a));
        assert!(manager.is_active(a));

        manager.acquire(b, counting_stop(&stops_b));
        assert_eq!(stops_a.load(Ordering::SeqCst), 1);
        assert_eq!(stops_b.load(Ordering::SeqCst), 0);
        assert!(!manager.is_active(a));
        assert!(manager.is_active(b));
    }

    #[test]
    fn reacquire_same_id_does_not_self_stop() {
        let manager = AudioManager::new();
        let stops = Arc::new(AtomicUsize::new(0));
        let id = SessionId::new();

        manager.acquire(id, counting_stop(&stops));
        manager.acquire(id, counting_stop(&stops));
        assert_eq!(stops.load(Ordering::SeqCst), 0);
        assert!(manager.is_active(id));
    }

    #[test]
    fn late_release_does_not_clobber_newer_session() {
        let manager = AudioManager::new();
        let a = SessionId::new();
        let b = SessionId::new();

        manager.acquire(a, Box::new(|| {}));
        manager.acquire(b, Box::new(|| {}));

        // A was superseded; its late release must be a no-op.
        manager.release(a);
        assert!(manager.is_active(b));

        manager.release(b);
        assert!(!manager.is_active(b));
    }
}
