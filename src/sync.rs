// ABOUTME: Sync orchestrator for one run
// ABOUTME: Ensures dirs, fetches with change detection, writes posts, tallies

use crate::api::NotionClient;
use crate::detect::should_refetch;
use crate::export::Exporter;
use crate::fetch::{fetch_posts, Decision, FetchOptions};
use crate::storage::{self, Paths};
use crate::summary::SyncSummary;
use crate::util::slug_for_title;
use crate::Result;

pub struct SyncConfig {
    pub database_id: String,
    pub published_only: bool,
}

/// Runs one full sync and returns its summary. Entries already up to date
/// are skipped; everything else is exported, transformed, and overwritten
/// at `<markdown_dir>/<slug>.md`.
pub fn sync_all(
    client: &NotionClient,
    exporter: &Exporter,
    paths: &Paths,
    config: &SyncConfig,
) -> Result<SyncSummary> {
    paths.ensure_dirs()?;

    let mut summary = SyncSummary::default();
    let options = FetchOptions {
        published_only: config.published_only,
    };

    let posts = fetch_posts(
        client,
        exporter,
        &config.database_id,
        paths,
        &options,
        &mut summary,
        |entry| {
            let post_path = paths.post_path(&slug_for_title(&entry.title));
            Ok(if should_refetch(entry, &post_path)? {
                Decision::Fetch
            } else {
                Decision::Skip
            })
        },
    )?;

    for post in posts {
        let slug = slug_for_title(&post.entry.title);
        storage::write_post(&paths.post_path(&slug), &post.markdown)?;
        summary.record_written(&slug, &post.entry.title);
    }

    Ok(summary)
}
