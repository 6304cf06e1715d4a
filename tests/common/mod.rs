//! Scripted fakes shared by the integration tests.
//!
//! Latencies are virtual: tests run under a paused tokio clock, so "slow"
//! synthesis and clip playback complete instantly in wall time while still
//! exercising real interleavings.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use tts_playback::{AudioOutput, Result, SynthesisClient, TtsError};

/// Synthesis fake with per-text latency and scripted failures.
///
/// The returned payload is the chunk text itself, so tests can map minted
/// urls back to chunk text through the url registry.
pub struct FakeSynthesisClient {
    default_latency: Duration,
    latencies: Mutex<HashMap<String, Duration>>,
    /// Remaining failures per text; decremented on each failing call.
    failures: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSynthesisClient {
    pub fn new() -> Self {
        Self {
            default_latency: Duration::from_millis(10),
            latencies: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Override the synthesis latency for one exact text.
    pub fn set_latency(&self, text: &str, latency: Duration) {
        self.latencies.lock().insert(text.to_string(), latency);
    }

    /// Make the next `count` requests for this text fail with a 500.
    pub fn fail_times(&self, text: &str, count: usize) {
        self.failures.lock().insert(text.to_string(), count);
    }

    /// Texts requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SynthesisClient for FakeSynthesisClient {
    async fn synthesize(&self, text: &str, cancel: &CancellationToken) -> Result<Bytes> {
        self.calls.lock().push(text.to_string());
        let latency = self
            .latencies
            .lock()
            .get(text)
            .copied()
            .unwrap_or(self.default_latency);

        tokio::select! {
            _ = cancel.cancelled() => return Err(TtsError::Cancelled),
            _ = tokio::time::sleep(latency) => {}
        }

        {
            let mut failures = self.failures.lock();
            if let Some(remaining) = failures.get_mut(text) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(TtsError::Synthesis { status: 500 });
                }
            }
        }

        Ok(Bytes::from(text.to_string().into_bytes()))
    }
}

/// Audio output fake: each clip "plays" for a fixed virtual duration and
/// records the urls it was given, in order.
pub struct FakeAudioOutput {
    clip_duration: Duration,
    playing: Mutex<bool>,
    started_at: Mutex<Option<tokio::time::Instant>>,
    played: Mutex<Vec<String>>,
    interrupt: tokio::sync::Notify,
    /// When set, `play` fails immediately with this many rejections left.
    rejections: Mutex<usize>,
    /// One-shot delay applied to the next `stop` call.
    stop_delay: Mutex<Option<Duration>>,
}

impl FakeAudioOutput {
    pub fn new(clip_duration: Duration) -> Arc<Self> {
        Arc::new(Self {
            clip_duration,
            playing: Mutex::new(false),
            started_at: Mutex::new(None),
            played: Mutex::new(Vec::new()),
            interrupt: tokio::sync::Notify::new(),
            rejections: Mutex::new(0),
            stop_delay: Mutex::new(None),
        })
    }

    /// Park the next `stop` call for `delay` before it takes effect,
    /// simulating a slow platform teardown.
    pub fn delay_next_stop(&self, delay: Duration) {
        *self.stop_delay.lock() = Some(delay);
    }

    /// Make the next `count` `play` calls fail like a policy rejection.
    pub fn reject_times(&self, count: usize) {
        *self.rejections.lock() = count;
    }

    /// Urls handed to `play` so far, in order.
    pub fn played(&self) -> Vec<String> {
        self.played.lock().clone()
    }

    pub fn currently_playing(&self) -> bool {
        *self.playing.lock()
    }
}

#[async_trait]
impl AudioOutput for FakeAudioOutput {
    async fn play(&self, url: &str) -> Result<()> {
        {
            let mut rejections = self.rejections.lock();
            if *rejections > 0 {
                *rejections -= 1;
                return Err(TtsError::AudioOutput("playback rejected".into()));
            }
        }
        self.played.lock().push(url.to_string());
        *self.playing.lock() = true;
        *self.started_at.lock() = Some(tokio::time::Instant::now());

        tokio::select! {
            _ = tokio::time::sleep(self.clip_duration) => {}
            _ = self.interrupt.notified() => {}
        }
        *self.playing.lock() = false;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let delay = self.stop_delay.lock().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.interrupt.notify_waiters();
        *self.playing.lock() = false;
        *self.started_at.lock() = None;
        Ok(())
    }

    async fn position(&self) -> Result<Duration> {
        let elapsed = self
            .started_at
            .lock()
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO);
        Ok(elapsed.min(self.clip_duration))
    }

    async fn duration(&self) -> Result<Option<Duration>> {
        Ok(Some(self.clip_duration))
    }

    async fn is_playing(&self) -> Result<bool> {
        Ok(*self.playing.lock())
    }
}
