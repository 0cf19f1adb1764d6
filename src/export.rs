// ABOUTME: Per-entry exporter speaking the notion.so export-task protocol
// ABOUTME: Enqueues a markdown export, polls it, downloads and unpacks the zip

use crate::{Error, Result};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::io::{Cursor, Read};
use std::time::Duration;

pub const NOTION_WWW_BASE: &str = "https://www.notion.so";

pub struct Exporter {
    client: Client,
    base_url: String,
    session_token: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl Exporter {
    pub fn new(session_token: String, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Exporter {
            client,
            base_url: base_url.unwrap_or_else(|| NOTION_WWW_BASE.into()),
            session_token,
            poll_interval: Duration::from_millis(500),
            max_polls: 240,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Exports one page as a markdown bundle: enqueue the task, poll until
    /// it completes, download the archive, and unpack it in memory.
    pub fn export(&self, page_id: &str) -> Result<ExportBundle> {
        let task_id = self.enqueue(page_id)?;
        let export_url = self.await_export_url(&task_id)?;
        let archive = self.download(&export_url)?;
        ExportBundle::from_zip(&archive)
    }

    fn enqueue(&self, page_id: &str) -> Result<String> {
        let body = json!({
            "task": {
                "eventName": "exportBlock",
                "request": {
                    "block": { "id": page_id },
                    "recursive": false,
                    "exportOptions": {
                        "exportType": "markdown",
                        "timeZone": "UTC",
                        "locale": "en"
                    }
                }
            }
        });

        let resp: Value = self.post("/api/v3/enqueueTask", body)?;
        resp.get("taskId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Export(format!("enqueueTask returned no taskId for page {}", page_id)))
    }

    fn await_export_url(&self, task_id: &str) -> Result<String> {
        for _ in 0..self.max_polls {
            let resp: Value = self.post("/api/v3/getTasks", json!({ "taskIds": [task_id] }))?;
            let task = resp
                .get("results")
                .and_then(Value::as_array)
                .and_then(|r| r.first())
                .ok_or_else(|| Error::Export(format!("getTasks returned no result for task {}", task_id)))?;

            match task.get("state").and_then(Value::as_str) {
                Some("success") => {
                    return task
                        .get("status")
                        .and_then(|s| s.get("exportURL"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| {
                            Error::Export(format!("task {} succeeded without an exportURL", task_id))
                        });
                }
                Some("failure") => {
                    let reason = task
                        .get("error")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown reason");
                    return Err(Error::Export(format!("export task {} failed: {}", task_id, reason)));
                }
                _ => std::thread::sleep(self.poll_interval),
            }
        }

        Err(Error::Export(format!(
            "export task {} did not complete after {} polls",
            task_id, self.max_polls
        )))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                endpoint: url.into(),
                status: status.as_u16(),
                message: "export download failed".into(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }

    fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header("Cookie", format!("token_v2={}", self.session_token))
            .header("Content-Type", "application/json")
            .header("User-Agent", "notedown/0.1 (Rust)")
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(Error::Api {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json()?)
    }
}

/// One file out of an export archive, named by its path inside the zip.
#[derive(Debug, Clone)]
pub struct BundleFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl BundleFile {
    /// First path component; the export nests everything in a per-page folder.
    pub fn subfolder(&self) -> &str {
        self.name.split('/').next().unwrap_or("")
    }

    pub fn filename(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn is_markdown(&self) -> bool {
        self.name.ends_with(".md")
    }
}

/// The unpacked export of one entry: one markdown body plus its assets.
#[derive(Debug, Default)]
pub struct ExportBundle {
    pub files: Vec<BundleFile>,
}

impl ExportBundle {
    pub fn from_zip(bytes: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::Export(format!("unreadable export archive: {}", e)))?;

        let mut files = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::Export(format!("unreadable archive member {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            files.push(BundleFile {
                name: file.name().to_string(),
                data,
            });
        }

        Ok(ExportBundle { files })
    }

    /// The single markdown body of the bundle, as trimmed UTF-8 text.
    pub fn markdown(&self) -> Result<&str> {
        let file = self
            .files
            .iter()
            .find(|f| f.is_markdown())
            .ok_or_else(|| Error::Shape("export bundle has no markdown file".into()))?;

        let text = std::str::from_utf8(&file.data)
            .map_err(|_| Error::Shape(format!("markdown member {} is not UTF-8", file.name)))?;
        Ok(text.trim())
    }

    pub fn assets(&self) -> impl Iterator<Item = &BundleFile> {
        self.files.iter().filter(|f| !f.is_markdown())
    }
}
