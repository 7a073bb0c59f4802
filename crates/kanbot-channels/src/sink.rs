//! Message sinks — implementations of the room broadcast primitive.

use async_trait::async_trait;

use kanbot_core::error::{KanbotError, Result};
use kanbot_core::traits::MessageSink;

/// Logs broadcasts instead of sending them. Default for local runs without a
/// configured chat backend.
#[derive(Default)]
pub struct ConsoleSink;

#[async_trait]
impl MessageSink for ConsoleSink {
    async fn message_room(&self, room: &str, text: &str) -> Result<()> {
        tracing::info!("[{room}] {text}");
        Ok(())
    }
}

/// POSTs each broadcast as JSON to a chat gateway webhook.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
    headers: Vec<(String, String)>,
}

impl WebhookSink {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            headers: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }
}

#[async_trait]
impl MessageSink for WebhookSink {
    async fn message_room(&self, room: &str, text: &str) -> Result<()> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "room": room, "text": text }))
            .timeout(std::time::Duration::from_secs(10));

        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| KanbotError::Sink(format!("webhook send failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KanbotError::Sink(format!("webhook returned {status}")));
        }
        Ok(())
    }
}
