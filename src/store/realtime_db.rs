//! Firebase Realtime Database REST client.
//!
//! Every path maps to `<db_url>/<path>.json`. A missing document reads back
//! as a literal `null` with status 200, and `POST` answers with the generated
//! child key as `{"name": "<key>"}`.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::{DocumentStore, StoreError};
use crate::config::HttpTimeouts;

// =============================================================================
// CLIENT
// =============================================================================

pub struct RealtimeDbClient {
    http: reqwest::Client,
    db_url: String,
}

impl RealtimeDbClient {
    /// Build a client rooted at `db_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(db_url: String, timeouts: HttpTimeouts) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| StoreError::HttpClientBuild(e.to_string()))?;
        let db_url = db_url.trim_end_matches('/').to_owned();
        Ok(Self { http, db_url })
    }

    fn url(&self, path: &str) -> String {
        document_url(&self.db_url, path)
    }

    /// Send a request and return the body text of a 2xx response.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(StoreError::Status { status, body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl DocumentStore for RealtimeDbClient {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let text = self.execute(self.http.get(self.url(path))).await?;
        parse_document(&text)
    }

    async fn put(&self, path: &str, value: &Value) -> Result<(), StoreError> {
        self.execute(self.http.put(self.url(path)).json(value)).await?;
        debug!(path, "document written");
        Ok(())
    }

    async fn post(&self, path: &str, value: &Value) -> Result<String, StoreError> {
        let text = self.execute(self.http.post(self.url(path)).json(value)).await?;
        let key = parse_push_key(&text)?;
        debug!(path, %key, "document appended");
        Ok(key)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.execute(self.http.delete(self.url(path))).await?;
        debug!(path, "document deleted");
        Ok(())
    }
}

// =============================================================================
// URLS
// =============================================================================

fn document_url(db_url: &str, path: &str) -> String {
    format!("{db_url}/{}.json", path.trim_matches('/'))
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_document(text: &str) -> Result<Option<Value>, StoreError> {
    let value: Value = serde_json::from_str(text).map_err(|e| StoreError::Parse(e.to_string()))?;
    Ok(if value.is_null() { None } else { Some(value) })
}

#[derive(serde::Deserialize)]
struct PushResponse {
    name: String,
}

fn parse_push_key(text: &str) -> Result<String, StoreError> {
    let resp: PushResponse = serde_json::from_str(text).map_err(|e| StoreError::Parse(e.to_string()))?;
    Ok(resp.name)
}

#[cfg(test)]
#[path = "realtime_db_test.rs"]
mod tests;
