// ABOUTME: Capability-checked entry model parsed from raw Notion page JSON
// ABOUTME: Required properties are validated eagerly with named errors

use crate::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

pub const TITLE_PROPERTY: &str = "Name";
pub const PUBLISHED_PROPERTY: &str = "published";
pub const LAST_MODIFIED_PROPERTY: &str = "lastModifiedTs";

/// One database row, read-only for the duration of a run. Required fields
/// are pulled out eagerly; everything else stays in `properties` untouched.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub published: bool,
    pub last_modified: DateTime<Utc>,
    pub properties: Map<String, Value>,
}

impl Entry {
    pub fn from_page(page: &Value) -> Result<Entry> {
        let id = page
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Shape("page has no id".into()))?
            .to_string();

        let properties = page
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::Shape(format!("page {} has no properties", id)))?;

        let title = extract_title(properties)
            .ok_or_else(|| Error::Shape(format!("page {} has no {} title", id, TITLE_PROPERTY)))?;

        let published = properties
            .get(PUBLISHED_PROPERTY)
            .and_then(|p| p.get("checkbox"))
            .and_then(Value::as_bool)
            .ok_or_else(|| {
                Error::Shape(format!(
                    "page {} (\"{}\") has no {} checkbox",
                    id, title, PUBLISHED_PROPERTY
                ))
            })?;

        let millis = properties
            .get(LAST_MODIFIED_PROPERTY)
            .and_then(|p| p.get("formula"))
            .and_then(|f| f.get("number"))
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                Error::Shape(format!(
                    "page {} (\"{}\") has no {} formula number",
                    id, title, LAST_MODIFIED_PROPERTY
                ))
            })?;

        let last_modified = Utc
            .timestamp_millis_opt(millis as i64)
            .single()
            .ok_or_else(|| {
                Error::Shape(format!(
                    "page {} has an out-of-range {} value {}",
                    id, LAST_MODIFIED_PROPERTY, millis
                ))
            })?;

        Ok(Entry {
            id,
            title,
            published,
            last_modified,
            properties: properties.clone(),
        })
    }
}

fn extract_title(properties: &Map<String, Value>) -> Option<String> {
    let fragment = properties
        .get(TITLE_PROPERTY)?
        .get("title")?
        .as_array()?
        .first()?;

    // Rich text fragments carry the text twice; prefer the raw content.
    let text = fragment
        .get("text")
        .and_then(|t| t.get("content"))
        .and_then(Value::as_str)
        .or_else(|| fragment.get("plain_text").and_then(Value::as_str))?;

    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}
