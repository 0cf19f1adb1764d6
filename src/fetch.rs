// ABOUTME: Entry fetch pipeline: paginate, filter, export, unpack, transform
// ABOUTME: Strictly sequential; entries keep the order the database returns

use crate::api::NotionClient;
use crate::export::Exporter;
use crate::model::Entry;
use crate::storage::{self, Paths};
use crate::summary::SyncSummary;
use crate::{transform, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Verdict of the caller-supplied inclusion predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Fetch,
    Skip,
}

/// An entry with its fully transformed markdown payload, ready to write.
#[derive(Debug)]
pub struct ResolvedPost {
    pub entry: Entry,
    pub markdown: String,
}

pub struct FetchOptions {
    pub published_only: bool,
}

/// Pages through the database, filters entries, exports the survivors, and
/// unpacks their assets. Unpublished and skipped entries are recorded on the
/// summary; any failure aborts the whole run.
pub fn fetch_posts<F>(
    client: &NotionClient,
    exporter: &Exporter,
    database_id: &str,
    paths: &Paths,
    options: &FetchOptions,
    summary: &mut SyncSummary,
    mut should_fetch: F,
) -> Result<Vec<ResolvedPost>>
where
    F: FnMut(&Entry) -> Result<Decision>,
{
    println!("Fetching posts list...");
    let pages = client.query_database_all(database_id)?;

    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos}/{len} posts {msg}")
            .expect("progress template")
            .progress_chars("##-"),
    );

    let mut posts = Vec::new();
    for page in &pages {
        let entry = Entry::from_page(page)?;

        if !entry.published && options.published_only {
            summary.record_unpublished(&entry);
            pb.inc(1);
            continue;
        }

        if should_fetch(&entry)? == Decision::Skip {
            summary.record_skipped(&entry);
            pb.inc(1);
            continue;
        }

        pb.set_message(format!("fetching \"{}\"", entry.title));
        let bundle = exporter.export(&entry.id)?;

        for asset in bundle.assets() {
            let target = paths.asset_path(asset.subfolder(), asset.filename());
            storage::write_asset(&target, &asset.data)?;
        }

        let markdown = transform::transform(bundle.markdown()?, &paths.assets_path)?;
        posts.push(ResolvedPost { entry, markdown });
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(posts)
}
