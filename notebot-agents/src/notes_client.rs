use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the notes service, used by the agent tools.
///
/// Every operation returns the response body re-encoded as compact JSON,
/// `None` for an empty body, or an error envelope. Failures never surface as
/// Rust errors so the model can read them like any other tool output.
#[derive(Debug, Clone)]
pub struct NotesClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl NotesClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /notes/{id}`
    pub async fn fetch_note(&self, token: &str, note_id: i64) -> Option<String> {
        let url = format!("{}/notes/{}", self.base_url, note_id);
        self.execute(self.http_client.get(&url), token).await
    }

    /// `GET /notes?limit&page&search`. Parameters go out unmodified.
    pub async fn list_notes(
        &self,
        token: &str,
        limit: i64,
        page: i64,
        search: &str,
    ) -> Option<String> {
        let url = format!("{}/notes", self.base_url);
        let request = self.http_client.get(&url).query(&[
            ("limit", limit.to_string()),
            ("page", page.to_string()),
            ("search", search.to_string()),
        ]);
        self.execute(request, token).await
    }

    /// `POST /notes {title, note}`
    pub async fn create_note(&self, token: &str, title: &str, note: &str) -> Option<String> {
        let url = format!("{}/notes", self.base_url);
        let request = self
            .http_client
            .post(&url)
            .json(&json!({ "title": title, "note": note }));
        self.execute(request, token).await
    }

    async fn execute(&self, request: reqwest::RequestBuilder, token: &str) -> Option<String> {
        let response = match request
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .bearer_auth(token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Notes request failed");
                return Some(request_error(&e));
            }
        };

        let status = response.status();
        if let Err(e) = response.error_for_status_ref() {
            debug!(status = status.as_u16(), "Notes service returned an error status");
            return Some(
                json!({
                    "error": format!("HTTP error occurred: {}", e),
                    "status_code": status.as_u16(),
                })
                .to_string(),
            );
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Some(request_error(&e)),
        };
        if body.is_empty() {
            return None;
        }

        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(value) => Some(value.to_string()),
            Err(e) => Some(json!({ "error": format!("Request error occurred: {}", e) }).to_string()),
        }
    }
}

fn request_error(e: &reqwest::Error) -> String {
    json!({ "error": format!("Request error occurred: {}", e) }).to_string()
}
