use crate::victron::VictronError;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

const BASE_URL: &str = "https://vrmapi.victronenergy.com/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the VRM installations API. One GET per fetch,
/// no retries; failures are the caller's problem.
#[derive(Clone)]
pub struct VrmClient {
    http: Client,
    base_url: String,
    site_id: String,
    token: String,
}

impl From<reqwest::Error> for VictronError {
    fn from(e: reqwest::Error) -> Self {
        Self(e.to_string())
    }
}

impl From<serde_json::Error> for VictronError {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}

impl VrmClient {
    pub fn new(site_id: &str, token: &str) -> Result<Self, VictronError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: BASE_URL.to_owned(),
            site_id: site_id.to_owned(),
            token: token.to_owned(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_owned();
        self
    }

    /// Fetch one endpoint and unwrap the `records` envelope.
    ///
    /// `Ok(None)` means the API answered 204 No Content and there is
    /// nothing to extract this round.
    pub async fn fetch_records(&self, endpoint: &str) -> Result<Option<Value>, VictronError> {
        let url = format!("{}/installations/{}/{}", self.base_url, self.site_id, endpoint);
        debug!("fetching {}", url);

        let response = self
            .http
            .get(&url)
            .header("X-Authorization", format!("Token {}", self.token))
            .send()
            .await
            .map_err(|e| {
                error!("request to {} failed: {}", endpoint, e);
                VictronError(format!("Request to {} failed: {}", endpoint, e))
            })?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK => {
                let body: Value = response.json().await.map_err(|e| {
                    error!("malformed response from {}: {}", endpoint, e);
                    VictronError(format!("Malformed response from {}: {}", endpoint, e))
                })?;
                match body.get("records") {
                    Some(records) => Ok(Some(records.clone())),
                    None => Ok(Some(body)),
                }
            }
            status => {
                error!("API error on {}: status {}", endpoint, status);
                Err(VictronError(format!(
                    "API error on {}: status {}",
                    endpoint, status
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;

    #[tokio::test]
    async fn fetch_unwraps_records() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/installations/12345/widgets/BatterySummary")
            .match_header("x-authorization", "Token abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "success": true,
                    "records": { "data": { "51": { "valueFloat": 88.0 } } }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = VrmClient::new("12345", "abc")
            .unwrap()
            .with_base_url(&server.url());
        let records = client
            .fetch_records("widgets/BatterySummary")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(88.0, records["data"]["51"]["valueFloat"].as_f64().unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_without_records_key_returns_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/installations/12345/overallstats")
            .with_status(200)
            .with_body(json!({ "today": { "totals": {} } }).to_string())
            .create_async()
            .await;

        let client = VrmClient::new("12345", "abc")
            .unwrap()
            .with_base_url(&server.url());
        let records = client.fetch_records("overallstats").await.unwrap().unwrap();

        assert!(records.get("today").is_some());
    }

    #[tokio::test]
    async fn fetch_no_content_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/installations/12345/widgets/Status")
            .with_status(204)
            .create_async()
            .await;

        let client = VrmClient::new("12345", "abc")
            .unwrap()
            .with_base_url(&server.url());

        assert!(client
            .fetch_records("widgets/Status")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn fetch_server_error_fails() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/installations/12345/widgets/Status")
            .with_status(500)
            .create_async()
            .await;

        let client = VrmClient::new("12345", "abc")
            .unwrap()
            .with_base_url(&server.url());

        assert!(client.fetch_records("widgets/Status").await.is_err());
    }

    #[tokio::test]
    async fn fetch_malformed_json_fails() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/installations/12345/widgets/Status")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = VrmClient::new("12345", "abc")
            .unwrap()
            .with_base_url(&server.url());

        assert!(client.fetch_records("widgets/Status").await.is_err());
    }
}
