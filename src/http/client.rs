//! HTTP client for thin-client mode.
//!
//! When `--server <url>` is passed to the CLI, commands proxy through a
//! remote Sterne facade instead of talking to Airtable directly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::PersonRecord;

/// HTTP client that proxies CLI commands to a remote Sterne facade.
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

/// Response from the /create, /update and /save endpoints
#[derive(Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub record: PersonRecord,
}

/// Response from the /status endpoint
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub table: String,
    pub max_stars: u32,
    pub track_log: bool,
    /// Keystroke debounce interval the facade recommends to clients
    #[serde(default)]
    pub debounce_ms: u64,
    /// Lifetime of transient status messages
    #[serde(default)]
    pub status_clear_ms: u64,
}

/// Error response from the server
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct SaveBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    vorname: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nachname: Option<&'a str>,
    sterne: u32,
    #[serde(rename = "recordId", skip_serializing_if = "Option::is_none")]
    record_id: Option<&'a str>,
}

impl Client {
    /// Create a new client pointing at the given facade URL.
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Search people via the remote facade.
    pub async fn search(&self, query: &str) -> Result<Vec<PersonRecord>> {
        let url = format!("{}/search", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .context("Failed to connect to sterne server")?;

        Self::check(resp)
            .await?
            .json()
            .await
            .context("Failed to parse search response")
    }

    /// Create a new person via the remote facade.
    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
        stars: u32,
    ) -> Result<PersonRecord> {
        self.post_save(SaveBody {
            vorname: Some(first_name),
            nachname: Some(last_name),
            sterne: stars,
            record_id: None,
        })
        .await
    }

    /// Update the rating of an existing record via the remote facade.
    pub async fn update(&self, record_id: &str, stars: u32) -> Result<PersonRecord> {
        self.post_save(SaveBody {
            vorname: None,
            nachname: None,
            sterne: stars,
            record_id: Some(record_id),
        })
        .await
    }

    /// Get facade health and configuration.
    pub async fn status(&self) -> Result<StatusResponse> {
        let url = format!("{}/status", self.base_url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to connect to sterne server")?;

        Self::check(resp)
            .await?
            .json()
            .await
            .context("Failed to parse status response")
    }

    /// Return the base URL (for display/logging).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_save(&self, body: SaveBody<'_>) -> Result<PersonRecord> {
        let url = format!("{}/save", self.base_url);

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to connect to sterne server")?;

        let saved: SaveResponse = Self::check(resp)
            .await?
            .json()
            .await
            .context("Failed to parse save response")?;

        if !saved.success {
            anyhow::bail!("Server reported an unsuccessful save");
        }
        Ok(saved.record)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body: ErrorBody = resp.json().await.unwrap_or(ErrorBody {
            error: format!("HTTP {status}"),
        });
        anyhow::bail!("Server error ({}): {}", status, body.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = Client::new("http://localhost:5050/");
        assert_eq!(client.base_url(), "http://localhost:5050");
    }

    #[test]
    fn test_client_preserves_url_without_trailing_slash() {
        let client = Client::new("http://localhost:5050");
        assert_eq!(client.base_url(), "http://localhost:5050");
    }

    #[test]
    fn test_save_body_create_shape() {
        let body = SaveBody {
            vorname: Some("Anna"),
            nachname: Some("Muster"),
            sterne: 0,
            record_id: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"vorname":"Anna","nachname":"Muster","sterne":0}"#
        );
    }

    #[test]
    fn test_save_body_update_shape() {
        let body = SaveBody {
            vorname: None,
            nachname: None,
            sterne: 1,
            record_id: Some("rec123"),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"sterne":1,"recordId":"rec123"}"#);
    }

    #[test]
    fn test_deserialize_save_response() {
        let json = r#"{
            "success": true,
            "record": {
                "id": "recABC",
                "fields": {"ID": "a1b2c3d4", "Vorname": "Anna", "Nachname": "Muster", "Sterne": 1}
            }
        }"#;
        let resp: SaveResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.record.id, "recABC");
        assert_eq!(resp.record.fields.stars, 1);
    }

    #[test]
    fn test_deserialize_status_response() {
        let json = r#"{
            "status": "ok",
            "table": "https://api.airtable.com/v0/appX/tblY",
            "max_stars": 5,
            "track_log": true,
            "debounce_ms": 300,
            "status_clear_ms": 2500
        }"#;
        let resp: StatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.max_stars, 5);
        assert!(resp.track_log);
        assert_eq!(resp.debounce_ms, 300);
        assert_eq!(resp.status_clear_ms, 2500);
    }

    #[tokio::test]
    async fn test_client_connection_refused() {
        let client = Client::new("http://127.0.0.1:19999");
        let result = client.status().await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("Failed to connect") || err.contains("error"),
            "Unexpected error: {}",
            err
        );
    }
}
