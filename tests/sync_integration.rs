// ABOUTME: End-to-end sync tests against mocked query and export endpoints
// ABOUTME: Covers idempotence, unpublished filtering, and local state errors

use notedown::api::NotionClient;
use notedown::export::Exporter;
use notedown::storage::Paths;
use notedown::sync::{sync_all, SyncConfig};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

const REMOTE_TS: u64 = 1_700_000_000_000;

fn page(id: &str, title: &str, published: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "properties": {
            "Name": { "title": [ { "text": { "content": title } } ] },
            "published": { "checkbox": published },
            "lastModifiedTs": { "formula": { "number": REMOTE_TS } }
        }
    })
}

fn export_zip(folder: &str, markdown: &str, asset: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(&mut cursor);
    writer
        .start_file(format!("{}/page.md", folder), SimpleFileOptions::default())
        .unwrap();
    writer.write_all(markdown.as_bytes()).unwrap();
    if let Some((name, data)) = asset {
        writer
            .start_file(format!("{}/{}", folder, name), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
    cursor.into_inner()
}

/// Mounts the export-task protocol for one page: enqueue → poll → download.
async fn mount_export(server: &MockServer, page_id: &str, task_id: &str, zip_bytes: Vec<u8>) {
    let download_path = format!("/export-{}.zip", task_id);

    Mock::given(method("POST"))
        .and(path("/api/v3/enqueueTask"))
        .and(body_partial_json(serde_json::json!({
            "task": { "request": { "block": { "id": page_id } } }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "taskId": task_id })),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/getTasks"))
        .and(body_partial_json(serde_json::json!({ "taskIds": [task_id] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [ {
                "state": "success",
                "status": { "exportURL": format!("{}{}", server.uri(), download_path) }
            } ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(download_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes))
        .mount(server)
        .await;
}

async fn mount_query(server: &MockServer, pages: Vec<serde_json::Value>) {
    Mock::given(method("POST"))
        .and(path("/v1/databases/db1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": pages,
            "next_cursor": null
        })))
        .mount(server)
        .await;
}

fn run_sync(uri: String, root: &Path, published_only: bool) -> notedown::Result<notedown::SyncSummary> {
    let client = NotionClient::new("secret".into(), Some(uri.clone()))
        .unwrap()
        .disable_throttle();
    let exporter = Exporter::new("v02:token".into(), Some(uri))
        .unwrap()
        .with_poll_interval(Duration::from_millis(0));
    let paths =
        Paths::new(root.join("posts"), "notion").with_static_root(root.join("static"));

    sync_all(
        &client,
        &exporter,
        &paths,
        &SyncConfig {
            database_id: "db1".into(),
            published_only,
        },
    )
}

#[tokio::test]
async fn test_sync_writes_then_skips() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_query(
        &server,
        vec![
            page("page-1", "Hello World", true),
            page("page-2", "Draft Post", false),
        ],
    )
    .await;

    let markdown = format!(
        "# Hello World\n\nlastModifiedTs: {}\npublished: true\n\nSee [cover.png](Hello%20World%20abc/cover.png) for details.",
        REMOTE_TS
    );
    mount_export(
        &server,
        "page-1",
        "task-1",
        export_zip("Hello World abc", &markdown, Some(("cover.png", b"\x89PNG"))),
    )
    .await;

    let uri = server.uri();
    let root = temp.path().to_path_buf();

    // First run exports and writes the published post
    let first = {
        let uri = uri.clone();
        let root = root.clone();
        tokio::task::spawn_blocking(move || run_sync(uri, &root, true))
            .await
            .unwrap()
            .unwrap()
    };

    assert_eq!(first.written.len(), 1);
    assert_eq!(first.written[0].slug, "hello-world");
    assert_eq!(first.written[0].title, "Hello World");
    assert!(first.skipped.is_empty());
    assert_eq!(first.unpublished, vec!["Draft Post".to_string()]);

    let post_path = root.join("posts/hello-world.md");
    let content = fs::read_to_string(&post_path).unwrap();
    assert!(content.starts_with("---\n"));
    assert!(content.contains(&format!("lastModifiedTs: {}", REMOTE_TS)));
    assert!(content.contains("title: Hello World"));
    assert!(content.contains("![cover.png](/notion/Hello%20World%20abc/cover.png)"));

    let asset_path = root.join("static/notion/Hello World abc/cover.png");
    assert_eq!(fs::read(&asset_path).unwrap(), b"\x89PNG");

    // Second run against the unchanged database writes nothing
    let second = tokio::task::spawn_blocking(move || run_sync(uri, &root, true))
        .await
        .unwrap()
        .unwrap();

    assert!(second.written.is_empty());
    assert_eq!(second.skipped, vec!["Hello World".to_string()]);
    assert_eq!(second.unpublished, vec!["Draft Post".to_string()]);
}

#[tokio::test]
async fn test_dev_mode_includes_unpublished() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_query(&server, vec![page("page-9", "Secret Draft", false)]).await;

    let markdown = format!(
        "# Secret Draft\n\nlastModifiedTs: {}\npublished: false\n\nStill cooking.",
        REMOTE_TS
    );
    mount_export(
        &server,
        "page-9",
        "task-9",
        export_zip("Secret Draft xyz", &markdown, None),
    )
    .await;

    let uri = server.uri();
    let root = temp.path().to_path_buf();

    let summary = tokio::task::spawn_blocking(move || run_sync(uri, &root, false))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.written.len(), 1);
    assert_eq!(summary.written[0].slug, "secret-draft");
    assert!(summary.unpublished.is_empty());
    assert!(temp.path().join("posts/secret-draft.md").exists());
}

#[tokio::test]
async fn test_corrupt_local_post_halts_the_run() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_query(&server, vec![page("page-1", "Hello World", true)]).await;

    // A local post without lastModifiedTs must stop the run before export
    let posts_dir = temp.path().join("posts");
    fs::create_dir_all(&posts_dir).unwrap();
    fs::write(
        posts_dir.join("hello-world.md"),
        "---\ntitle: Hello World\n---\n\nstale body\n",
    )
    .unwrap();

    let uri = server.uri();
    let root = temp.path().to_path_buf();

    let err = tokio::task::spawn_blocking(move || run_sync(uri, &root, true))
        .await
        .unwrap()
        .unwrap_err();

    assert_eq!(err.exit_code(), 9);
    assert!(err.to_string().contains("lastModifiedTs"));
}
