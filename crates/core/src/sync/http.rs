use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

use super::traits::{PushOutcome, SyncBackend, SyncEnvelope};
use crate::errors::EngineError;

/// JSON-over-HTTP sync backend against the planner's REST API.
///
/// Endpoints relative to the base URL:
/// - `POST /budget` — push; responds `{"status": "ack", "revision": n}` or
///   `{"status": "conflict", "server": {...}}`
/// - `GET /budget` — pull; responds with the server's envelope
pub struct HttpSyncBackend {
    client: Client,
    base_url: String,
}

impl HttpSyncBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
        }
    }
}

// ── API response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct PushResponse {
    status: String,
    revision: Option<u64>,
    server: Option<SyncEnvelope>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SyncBackend for HttpSyncBackend {
    fn name(&self) -> &str {
        "HttpSync"
    }

    async fn push(&self, envelope: &SyncEnvelope) -> Result<PushOutcome, EngineError> {
        let url = format!("{}/budget", self.base_url);
        debug!(revision = envelope.revision, "pushing plan state");

        let resp: PushResponse = self
            .client
            .post(&url)
            .json(envelope)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| EngineError::Api {
                endpoint: "POST /budget".into(),
                message: format!("Failed to parse push response: {e}"),
            })?;

        match resp.status.as_str() {
            "ack" => {
                let revision = resp.revision.ok_or_else(|| EngineError::Api {
                    endpoint: "POST /budget".into(),
                    message: "ack without a revision".into(),
                })?;
                Ok(PushOutcome::Ack { revision })
            }
            "conflict" => {
                let server = resp.server.ok_or_else(|| EngineError::Api {
                    endpoint: "POST /budget".into(),
                    message: "conflict without server state".into(),
                })?;
                Ok(PushOutcome::Conflict { server })
            }
            other => Err(EngineError::Api {
                endpoint: "POST /budget".into(),
                message: format!("Unexpected push status '{other}'"),
            }),
        }
    }

    async fn pull(&self) -> Result<SyncEnvelope, EngineError> {
        let url = format!("{}/budget", self.base_url);
        debug!("pulling plan state");

        let envelope: SyncEnvelope = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| EngineError::Api {
                endpoint: "GET /budget".into(),
                message: format!("Failed to parse pull response: {e}"),
            })?;

        Ok(envelope)
    }
}
