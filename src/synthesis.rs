//! # Synthesis Client
//!
//! Wire contract to the text-to-speech endpoint:
//! `GET <endpoint>?text=<url-encoded chunk text>`. Any 2xx response body is
//! an opaque audio payload; any non-2xx status is a typed failure carrying
//! the status code. Requests are abortable mid-flight through the caller's
//! cancellation token.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, TtsError};

/// Abstraction over the synthesis network endpoint.
///
/// The playback core only depends on this trait; tests substitute mocks or
/// scripted fakes for the real HTTP client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SynthesisClient: Send + Sync {
    /// Synthesize `text` into an audio payload.
    ///
    /// # Errors
    ///
    /// - [`TtsError::Cancelled`] if `cancel` fires while the request is in
    ///   flight.
    /// - [`TtsError::Synthesis`] for any non-2xx response.
    /// - [`TtsError::Network`] for transport-level failures.
    async fn synthesize(&self, text: &str, cancel: &CancellationToken) -> Result<Bytes>;
}

/// [`SynthesisClient`] backed by `reqwest`.
pub struct HttpSynthesisClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSynthesisClient {
    /// Create a client against the given endpoint url.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a client with a request timeout on the underlying transport.
    ///
    /// There is deliberately no per-fetch timeout in the playback core; a
    /// hung fetch delays its chunk until the user stops. This knob is for
    /// hosts that want the transport to enforce one anyway.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TtsError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SynthesisClient for HttpSynthesisClient {
    async fn synthesize(&self, text: &str, cancel: &CancellationToken) -> Result<Bytes> {
        let request = self.client.get(&self.endpoint).query(&[("text", text)]);

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(TtsError::Cancelled),
            result = request.send() => {
                result.map_err(|e| TtsError::Network(e.to_string()))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::Synthesis {
                status: status.as_u16(),
            });
        }

        let payload = tokio::select! {
            _ = cancel.cancelled() => return Err(TtsError::Cancelled),
            result = response.bytes() => {
                result.map_err(|e| TtsError::Network(e.to_string()))?
            }
        };

        debug!(bytes = payload.len(), "Synthesized audio payload received");
        Ok(payload)
    }
}
