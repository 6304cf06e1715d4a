//! # Playback Controller
//!
//! State machine owning one playback session at a time: chunk sequencing,
//! look-ahead prefetch, progress reporting, and race-free cancellation.
//!
//! ## States
//!
//! ```text
//! Idle ──play()──> Loading ──first chunk resolved──> Playing ──last chunk ends──> Idle
//!                     │                                 │
//!                     └────────── failure ──────────────┘
//!                                    │
//!                                    ▼
//!                                  Error ──cooldown──> Idle
//! ```
//!
//! ## Cancellation discipline
//!
//! Every session carries a [`CancellationToken`]; every continuation that
//! outlives an await (driver steps, prefetches, progress ticks, the error
//! cooldown) re-checks the token *and* that its session is still the
//! controller's live one before mutating shared state. A stale session's
//! late network response therefore cannot revive dead state or overwrite a
//! newer session's progress.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::chunker::{self, TextChunk};
use crate::config::PlaybackConfig;
use crate::error::{Result, TtsError};
use crate::fetcher::Fetcher;
use crate::manager::{AudioManager, SessionId};
use crate::progress::{format_elapsed, PlaybackProgress};
use crate::traits::AudioOutput;

/// Externally visible controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    /// No session; the control affords `play`.
    Idle,
    /// Session created, first chunk's audio not yet playing.
    Loading,
    /// A clip is audible (or between clips of a live session).
    Playing,
    /// A non-cancellation failure occurred; auto-resets to `Idle` after the
    /// configured cooldown.
    Error,
}

struct LiveSession {
    id: SessionId,
    token: CancellationToken,
}

/// Drives playback of chunked text with a constant look-ahead window.
///
/// A controller owns at most one live audio element's worth of playback;
/// `play` replaces any running session rather than stacking players.
/// Multiple controllers stay mutually exclusive through the shared
/// [`AudioManager`].
pub struct PlaybackController {
    config: PlaybackConfig,
    fetcher: Arc<Fetcher>,
    output: Arc<dyn AudioOutput>,
    manager: Arc<AudioManager>,
    state_tx: Arc<watch::Sender<PlayerState>>,
    progress_tx: Arc<watch::Sender<PlaybackProgress>>,
    live: Arc<Mutex<Option<LiveSession>>>,
}

impl PlaybackController {
    /// Create a controller.
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::InvalidConfig`] if `config` fails validation.
    pub fn new(
        config: PlaybackConfig,
        fetcher: Arc<Fetcher>,
        output: Arc<dyn AudioOutput>,
        manager: Arc<AudioManager>,
    ) -> Result<Self> {
        config.validate().map_err(TtsError::InvalidConfig)?;
        let (state_tx, _) = watch::channel(PlayerState::Idle);
        let (progress_tx, _) = watch::channel(PlaybackProgress::default());
        Ok(Self {
            config,
            fetcher,
            output,
            manager,
            state_tx: Arc::new(state_tx),
            progress_tx: Arc::new(progress_tx),
            live: Arc::new(Mutex::new(None)),
        })
    }

    /// Current controller state.
    pub fn state(&self) -> PlayerState {
        *self.state_tx.borrow()
    }

    /// Watch stream of state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<PlayerState> {
        self.state_tx.subscribe()
    }

    /// Latest progress snapshot.
    pub fn progress(&self) -> PlaybackProgress {
        self.progress_tx.borrow().clone()
    }

    /// Watch stream of progress snapshots.
    pub fn subscribe_progress(&self) -> watch::Receiver<PlaybackProgress> {
        self.progress_tx.subscribe()
    }

    /// Whether a session is loading or playing.
    pub fn is_busy(&self) -> bool {
        matches!(self.state(), PlayerState::Loading | PlayerState::Playing)
    }

    /// Start playing `text`, replacing any session this controller is
    /// already running and preempting any other audible session registered
    /// with the shared [`AudioManager`].
    ///
    /// Text that normalizes to nothing produces no session; the controller
    /// stays `Idle`.
    #[instrument(skip(self, text))]
    pub async fn play(&self, text: &str) -> Result<()> {
        let chunks = chunker::chunk(text, &self.config.chunker);
        if chunks.is_empty() {
            debug!("Text normalized to nothing; no playback attempted");
            return Ok(());
        }

        // Replace any live session before its successor exists: taking the
        // slot first means the old driver's continuations see a foreign
        // session and leave all shared state alone.
        if let Some(old) = self.live.lock().take() {
            debug!(id = %old.id, "Replacing live session");
            old.token.cancel();
        }
        self.output.stop().await.ok();

        let id = SessionId::new();
        let token = CancellationToken::new();
        *self.live.lock() = Some(LiveSession {
            id,
            token: token.clone(),
        });

        let preempt_token = token.clone();
        self.manager.acquire(id, Box::new(move || preempt_token.cancel()));

        self.state_tx.send_replace(PlayerState::Loading);
        self.progress_tx
            .send_replace(PlaybackProgress::start_of(chunks.len()));
        info!(%id, chunks = chunks.len(), "Starting playback session");

        let driver = SessionDriver {
            id,
            token,
            chunks,
            config: self.config.clone(),
            fetcher: Arc::clone(&self.fetcher),
            output: Arc::clone(&self.output),
            manager: Arc::clone(&self.manager),
            state_tx: Arc::clone(&self.state_tx),
            progress_tx: Arc::clone(&self.progress_tx),
            live: Arc::clone(&self.live),
        };
        tokio::spawn(driver.run());
        Ok(())
    }

    /// Stop the live session, if any: cancel its fetches, silence the
    /// output, release the audible-session claim, and reset displayed
    /// state to defaults. Idempotent.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let Some(session) = self.live.lock().take() else {
            return;
        };
        session.token.cancel();
        self.output.stop().await.ok();
        self.manager.release(session.id);
        self.state_tx.send_replace(PlayerState::Idle);
        self.progress_tx.send_replace(PlaybackProgress::default());
        debug!(id = %session.id, "Playback stopped");
    }

    /// Toggle semantics for a single play/stop control: stop when loading
    /// or playing, otherwise start playing `text`.
    pub async fn toggle(&self, text: &str) -> Result<()> {
        if self.is_busy() {
            self.stop().await;
            Ok(())
        } else {
            self.play(text).await
        }
    }
}

// ============================================================================
// Session Driver
// ============================================================================

/// Everything one spawned session task needs, cloned out of the controller
/// so the task owns its world.
struct SessionDriver {
    id: SessionId,
    token: CancellationToken,
    chunks: Vec<TextChunk>,
    config: PlaybackConfig,
    fetcher: Arc<Fetcher>,
    output: Arc<dyn AudioOutput>,
    manager: Arc<AudioManager>,
    state_tx: Arc<watch::Sender<PlayerState>>,
    progress_tx: Arc<watch::Sender<PlaybackProgress>>,
    live: Arc<Mutex<Option<LiveSession>>>,
}

impl SessionDriver {
    #[instrument(skip(self), fields(session = %self.id))]
    async fn run(self) {
        match self.drive().await {
            Ok(()) => self.complete().await,
            Err(e) if e.is_cancellation() => self.cleanup_cancelled().await,
            Err(e) => self.fail(e).await,
        }
    }

    /// Whether this session is still the controller's live one.
    fn is_live(&self) -> bool {
        !self.token.is_cancelled()
            && self
                .live
                .lock()
                .as_ref()
                .is_some_and(|s| s.id == self.id)
    }

    /// Vacate the live slot and publish `state` plus default progress, all
    /// under the slot lock. Teardown must not reach an await point between
    /// deciding it owns the session and resetting the published state: a
    /// session started during that window would have its state clobbered
    /// when the stale teardown resumed.
    ///
    /// Returns whether this session still held the slot.
    fn reset_if_live(&self, state: PlayerState) -> bool {
        let mut live = self.live.lock();
        if !live.as_ref().is_some_and(|s| s.id == self.id) {
            return false;
        }
        *live = None;
        self.state_tx.send_replace(state);
        self.progress_tx.send_replace(PlaybackProgress::default());
        true
    }

    async fn drive(&self) -> Result<()> {
        // Chunk 0 and chunk 1 are requested concurrently, and both settle
        // before the first clip starts: by the time chunk 0 is audible,
        // chunk 1 is cached or in flight with a head start, minimizing the
        // gap at the first chunk boundary.
        let first = self.fetcher.resolve(&self.chunks[0].text, &self.token);
        let second = async {
            match self.chunks.get(1) {
                Some(chunk) => Some(self.fetcher.resolve(&chunk.text, &self.token).await),
                None => None,
            }
        };
        let (first, second) = tokio::join!(first, second);
        if let Some(Err(e)) = second {
            if !e.is_cancellation() {
                warn!(error = %e, "Look-ahead fetch for second chunk failed; will retry on demand");
            }
        }
        let mut url = first?;

        if !self.is_live() {
            return Err(TtsError::Cancelled);
        }
        self.state_tx.send_replace(PlayerState::Playing);
        debug!("First chunk resolved, playback starting");

        let current_index = Arc::new(AtomicUsize::new(0));
        let sampler_token = self.token.child_token();
        self.spawn_progress_sampler(Arc::clone(&current_index), sampler_token.clone());

        let mut index = 0;
        loop {
            current_index.store(index, Ordering::SeqCst);

            // Keep the look-ahead window full while this clip plays.
            let ahead = index + self.config.lookahead_chunks;
            if let Some(chunk) = self.chunks.get(ahead) {
                if !self.fetcher.is_resolved_or_pending(&chunk.text) {
                    self.fetcher
                        .spawn_prefetch(chunk.text.clone(), self.token.child_token());
                }
            }

            tokio::select! {
                _ = self.token.cancelled() => return Err(TtsError::Cancelled),
                result = self.output.play(&url) => result?,
            }

            index += 1;
            let Some(chunk) = self.chunks.get(index) else {
                sampler_token.cancel();
                return Ok(());
            };
            // Strictly in-order consumption: even if a later chunk resolved
            // first, playback advances one index at a time and waits here
            // for this chunk's own fetch (in flight via look-ahead, or
            // issued now) rather than skipping ahead.
            url = self.fetcher.resolve(&chunk.text, &self.token).await?;
        }
    }

    /// Natural completion: the last clip finished.
    async fn complete(&self) {
        // Tear down the sampler and any stray look-ahead work first so
        // nothing republishes progress after the reset.
        self.token.cancel();
        if self.reset_if_live(PlayerState::Idle) {
            self.manager.release(self.id);
            info!("Playback session completed");
        }
    }

    /// Cancellation observed mid-session. `stop()` resets state itself, so
    /// this only acts when the session was preempted through the manager
    /// (or replaced) while still holding the live slot.
    async fn cleanup_cancelled(&self) {
        if !self.reset_if_live(PlayerState::Idle) {
            return;
        }
        self.output.stop().await.ok();
        self.manager.release(self.id);
        debug!("Session cancelled; state reset");
    }

    /// Non-cancellation failure while loading or playing the current chunk.
    async fn fail(&self, err: TtsError) {
        self.token.cancel();
        if !self.reset_if_live(PlayerState::Error) {
            debug!(error = %err, "Failure from superseded session ignored");
            return;
        }
        error!(error = %err, "Playback failed");
        self.output.stop().await.ok();
        self.manager.release(self.id);

        // Cooldown, then back to Idle so the control affords a fresh manual
        // retry. No retry is attempted here. A session started during the
        // cooldown owns the state and must not be clobbered.
        let state_tx = Arc::clone(&self.state_tx);
        let live = Arc::clone(&self.live);
        let cooldown = self.config.error_cooldown;
        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            let idle_again = live.lock().is_none() && *state_tx.borrow() == PlayerState::Error;
            if idle_again {
                state_tx.send_replace(PlayerState::Idle);
            }
        });
    }

    /// Re-sample playback position on a short interval while the clip is
    /// audible, publishing a fractional progress value and an elapsed-time
    /// label. Stops when the session token (or its child) fires.
    fn spawn_progress_sampler(&self, current_index: Arc<AtomicUsize>, token: CancellationToken) {
        let output = Arc::clone(&self.output);
        let progress_tx = Arc::clone(&self.progress_tx);
        let chunk_count = self.chunks.len();
        let interval = self.config.progress_interval;

        tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if !output.is_playing().await.unwrap_or(false) {
                    continue;
                }
                let index = current_index.load(Ordering::SeqCst);
                let clip_fraction = match (output.position().await, output.duration().await) {
                    (Ok(position), Ok(Some(duration))) if !duration.is_zero() => {
                        (position.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
                    }
                    _ => 0.0,
                };
                let fraction =
                    ((index as f32 + clip_fraction) / chunk_count.max(1) as f32).clamp(0.0, 1.0);

                // The session may have died while we awaited the output.
                if token.is_cancelled() {
                    break;
                }
                progress_tx.send_replace(PlaybackProgress {
                    fraction,
                    elapsed: format_elapsed(started.elapsed()),
                    chunk_index: index,
                    chunk_count,
                });
            }
        });
    }
}
