// ABOUTME: Change detection between a remote entry and its local post file
// ABOUTME: A post without lastModifiedTs halts the run for manual cleanup

use crate::model::{Entry, LAST_MODIFIED_PROPERTY};
use crate::{storage, Error, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::path::Path;

/// True when the entry needs re-export: no local file, or the local
/// `lastModifiedTs` is strictly older than the remote timestamp.
pub fn should_refetch(entry: &Entry, post_path: &Path) -> Result<bool> {
    if !post_path.exists() {
        return Ok(true);
    }

    let frontmatter = storage::read_frontmatter(post_path)?;
    let ts_value = frontmatter
        .as_ref()
        .and_then(|m| m.get(LAST_MODIFIED_PROPERTY))
        .cloned()
        .ok_or_else(|| missing_ts(post_path))?;

    let local = parse_local_ts(&ts_value).ok_or_else(|| {
        Error::LocalState(format!(
            "Post {} has an unreadable {} value. Delete the local markdown and rerun",
            post_path.display(),
            LAST_MODIFIED_PROPERTY
        ))
    })?;

    Ok(local < entry.last_modified)
}

fn missing_ts(post_path: &Path) -> Error {
    Error::LocalState(format!(
        "Post {} has no {}. Delete the local markdown and rerun",
        post_path.display(),
        LAST_MODIFIED_PROPERTY
    ))
}

/// Notion writes the formula as epoch milliseconds; hand-edited files may
/// carry an RFC 3339 timestamp or a bare date instead.
fn parse_local_ts(value: &serde_yaml::Value) -> Option<DateTime<Utc>> {
    if let Some(millis) = value.as_i64() {
        return Utc.timestamp_millis_opt(millis).single();
    }
    if let Some(millis) = value.as_f64() {
        return Utc.timestamp_millis_opt(millis as i64).single();
    }
    let s = value.as_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}
