// ABOUTME: Per-run tallies of written, skipped, and unpublished posts
// ABOUTME: Threaded through the sync as a plain value and rendered at the end

use crate::model::Entry;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct WrittenPost {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Default)]
pub struct SyncSummary {
    pub written: Vec<WrittenPost>,
    pub skipped: Vec<String>,
    pub unpublished: Vec<String>,
}

impl SyncSummary {
    pub fn record_written(&mut self, slug: &str, title: &str) {
        self.written.push(WrittenPost {
            slug: slug.to_string(),
            title: title.to_string(),
        });
    }

    pub fn record_skipped(&mut self, entry: &Entry) {
        self.skipped.push(entry.title.clone());
    }

    pub fn record_unpublished(&mut self, entry: &Entry) {
        self.unpublished.push(entry.title.clone());
    }

    /// Human-readable report. Groups with no members are omitted.
    pub fn render(&self, markdown_dir: &Path) -> String {
        let mut out = format!("Markdown posts available in {}\n", markdown_dir.display());

        if !self.skipped.is_empty() {
            out.push_str(&format!(
                "\nTotal {} posts were skipped (already up to date):\n",
                self.skipped.len()
            ));
            for title in &self.skipped {
                out.push_str(&format!("- {}\n", title));
            }
        }

        if !self.written.is_empty() {
            out.push_str(&format!("\nTotal {} posts were written:\n", self.written.len()));
            for post in &self.written {
                out.push_str(&format!("- {} => {}\n", post.title, post.slug));
            }
        }

        if !self.unpublished.is_empty() {
            out.push_str(&format!(
                "\nTotal {} posts were unpublished:\n",
                self.unpublished.len()
            ));
            for title in &self.unpublished {
                out.push_str(&format!("- {}\n", title));
            }
        }

        out
    }
}
