//! HTTP client for the node API

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            return Err(anyhow!(describe_error(&body, status.as_u16())));
        }
        Ok(serde_json::from_value(body)?)
    }
}

/// Render an API error body as one line, including the revert kind and
/// transaction hash when the node reports one.
pub fn describe_error(body: &Value, status: u16) -> String {
    let message = body["message"].as_str().unwrap_or("no message");
    match (body["kind"].as_str(), body["tx_hash"].as_str()) {
        (Some(kind), Some(tx_hash)) if !tx_hash.is_empty() => {
            format!("{} ({}), tx {}", kind, message, tx_hash)
        }
        (Some(kind), _) => format!("{} ({})", kind, message),
        _ => {
            let error = body["error"].as_str().unwrap_or("error");
            format!("HTTP {} {}: {}", status, error, message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_revert() {
        let body = json!({
            "error": "reverted",
            "kind": "AlreadyVoted",
            "message": "Already voted",
            "tx_hash": "0xabc",
        });
        assert_eq!(describe_error(&body, 422), "AlreadyVoted (Already voted), tx 0xabc");
    }

    #[test]
    fn test_describe_plain_error() {
        let body = json!({ "error": "proposal_not_found", "message": "Proposal 4 not found" });
        assert_eq!(
            describe_error(&body, 404),
            "HTTP 404 proposal_not_found: Proposal 4 not found"
        );
    }

    #[test]
    fn test_url_joins_base() {
        let client = ApiClient::new("http://localhost:24180/");
        assert_eq!(client.url("/health"), "http://localhost:24180/health");
    }
}
