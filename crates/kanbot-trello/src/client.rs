//! Trello REST client — authenticated calls against the fixed organization
//! namespace, with every response checked for a 2xx status before decoding.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use kanbot_core::error::{KanbotError, Result};
use kanbot_core::traits::BoardService;
use kanbot_core::types::{Board, List, Notification, NotificationQuery};

const DEFAULT_BASE_URL: &str = "https://api.trello.com";
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Trello API client. Cheap to clone; the inner reqwest client pools
/// connections.
#[derive(Clone)]
pub struct TrelloClient {
    client: reqwest::Client,
    base_url: String,
    key: String,
    token: String,
    organization: String,
}

impl TrelloClient {
    pub fn new(key: &str, token: &str, organization: &str) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, key, token, organization)
    }

    /// Point the client at a different host (tests, proxies).
    pub fn with_base_url(base_url: &str, key: &str, token: &str, organization: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            token: token.to_string(),
            organization: organization.to_string(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/1/{}", self.base_url, path)
    }

    fn auth_params(&self) -> [(&'static str, &str); 2] {
        [("key", &self.key), ("token", &self.token)]
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(self.api_url(path))
            .query(&self.auth_params())
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| KanbotError::Service(format!("GET /1/{path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KanbotError::Service(format!(
                "GET /1/{path} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| KanbotError::Service(format!("GET /1/{path} invalid response: {e}")))
    }

    async fn send_mutation(&self, request: reqwest::RequestBuilder, what: &str) -> Result<()> {
        let response = request
            .query(&self.auth_params())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| KanbotError::Service(format!("{what} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KanbotError::Service(format!(
                "{what} returned {status}: {body}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BoardService for TrelloClient {
    async fn boards(&self) -> Result<Vec<Board>> {
        let path = format!("organizations/{}/boards", self.organization);
        self.get_json(
            &path,
            &[("lists", "open".into()), ("filter", "pinned".into())],
        )
        .await
    }

    async fn board_lists(&self, board_id: &str) -> Result<Vec<List>> {
        let path = format!("boards/{board_id}/lists");
        self.get_json(&path, &[("cards", "open".into())]).await
    }

    async fn archive_card(&self, card_id: &str) -> Result<()> {
        let request = self
            .client
            .put(self.api_url(&format!("cards/{card_id}/closed")))
            .query(&[("value", "true")]);
        self.send_mutation(request, &format!("archive card {card_id}"))
            .await
    }

    async fn comment_on_card(&self, card_id: &str, text: &str) -> Result<()> {
        let request = self
            .client
            .post(self.api_url(&format!("cards/{card_id}/actions/comments")))
            .query(&[("text", text)]);
        self.send_mutation(request, &format!("comment on card {card_id}"))
            .await
    }

    async fn recent_notifications(&self, query: &NotificationQuery) -> Result<Vec<Notification>> {
        let mut params: Vec<(&str, String)> = vec![
            ("filter", query.filter.join(",")),
            ("limit", query.limit.to_string()),
        ];
        if let Some(read_filter) = &query.read_filter {
            params.push(("read_filter", read_filter.clone()));
        }
        if let Some(since) = &query.since {
            params.push(("since", since.clone()));
        }
        self.get_json("members/me/notifications", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = TrelloClient::new("k", "t", "acme");
        assert_eq!(
            client.api_url("organizations/acme/boards"),
            "https://api.trello.com/1/organizations/acme/boards"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = TrelloClient::with_base_url("http://localhost:8080/", "k", "t", "acme");
        assert_eq!(client.api_url("cards/x/closed"), "http://localhost:8080/1/cards/x/closed");
    }
}
