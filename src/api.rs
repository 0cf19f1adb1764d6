// ABOUTME: Blocking HTTP client for the Notion public API
// ABOUTME: Handles throttling, auth headers, pagination, and fail-fast errors

use crate::{Error, Result};
use rand::Rng;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub const NOTION_API_BASE: &str = "https://api.notion.com";
const NOTION_VERSION: &str = "2022-06-28";

fn preview(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

pub struct NotionClient {
    client: Client,
    base_url: String,
    token: String,
    throttle_min: u64,
    throttle_max: u64,
}

impl NotionClient {
    pub fn new(token: String, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(NotionClient {
            client,
            base_url: base_url.unwrap_or_else(|| NOTION_API_BASE.into()),
            token,
            throttle_min: 100,
            throttle_max: 300,
        })
    }

    pub fn with_throttle(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.throttle_min = min_ms;
        self.throttle_max = max_ms;
        self
    }

    pub fn disable_throttle(mut self) -> Self {
        self.throttle_min = 0;
        self.throttle_max = 0;
        self
    }

    fn throttle(&self) {
        if self.throttle_max > 0 {
            let sleep_ms = rand::thread_rng().gen_range(self.throttle_min..=self.throttle_max);
            std::thread::sleep(Duration::from_millis(sleep_ms));
        }
    }

    fn post<T: serde::de::DeserializeOwned>(&self, endpoint: &str, body: Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", NOTION_VERSION)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("User-Agent", "notedown/0.1 (Rust)")
            .json(&body)
            .send()?;

        self.throttle();

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(Error::Api {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                message: preview(&message, 100),
            });
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| {
            eprintln!("Failed to parse response from {}: {}", endpoint, e);
            eprintln!("Response body (first 500 chars): {}", preview(&body, 500));
            Error::Parse(e)
        })
    }

    /// Queries every page of the database, following cursors until the API
    /// stops returning one. Page order is preserved as the API returns it.
    pub fn query_database_all(&self, database_id: &str) -> Result<Vec<Value>> {
        #[derive(serde::Deserialize)]
        struct QueryResponse {
            results: Vec<Value>,
            #[serde(default)]
            next_cursor: Option<String>,
        }

        let endpoint = format!("/v1/databases/{}/query", database_id);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = match &cursor {
                Some(c) => json!({ "start_cursor": c }),
                None => json!({}),
            };
            let resp: QueryResponse = self.post(&endpoint, body)?;
            pages.extend(resp.results);
            match resp.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(pages)
    }
}
