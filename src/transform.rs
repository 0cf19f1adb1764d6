// ABOUTME: Markdown transformation passes applied to exported post bodies
// ABOUTME: Frontmatter repair, asset link rewriting, and embed expansion

use crate::{Error, Result};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

const SUPPORTED_EMBED_TYPE: &str = "CODESANDBOX";

fn media_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(!?)\[([^\]]*)\]\s*\(([^)\s]+\.(?:webp|png|avif|jpg|jpeg|gif|mp4|webm))\)")
            .expect("media link pattern")
    })
}

fn embed_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{EMBED_([^_}]+)_([^}]+)\}").expect("embed token pattern"))
}

/// Runs the three passes in order on a raw exported body.
pub fn transform(markdown: &str, assets_path: &str) -> Result<String> {
    let repaired = repair_frontmatter(markdown)?;
    let rewritten = rewrite_asset_links(&repaired, assets_path);
    expand_embeds(&rewritten)
}

/// The export emits an H1 title block, then a loose key:value block, then
/// the body, all separated by blank lines but without `---` delimiters.
/// This rebuilds the document as conventional frontmatter. Already-delimited
/// documents pass through unchanged, so the repair is idempotent.
pub fn repair_frontmatter(markdown: &str) -> Result<String> {
    if markdown.starts_with("---\n") {
        return Ok(markdown.to_string());
    }

    let mut blocks = markdown.splitn(3, "\n\n");
    let title_block = blocks.next().unwrap_or("");
    let frontmatter = blocks
        .next()
        .ok_or_else(|| Error::Shape("exported markdown has no frontmatter block".into()))?;
    let body = blocks.next().unwrap_or("");

    let title = title_block.trim().trim_start_matches('#').trim_start();

    // Titles like "Foo: Bar" must come out quoted or the written
    // frontmatter stops being parseable on the next run.
    let title = serde_yaml::to_string(&title)
        .map_err(|e| Error::Shape(format!("title {:?} is not YAML-serializable: {}", title, e)))?;

    Ok(format!(
        "---\n{}\ntitle: {}\n---\n\n{}",
        frontmatter,
        title.trim_end(),
        body
    ))
}

/// Rewrites relative media links to live under the configured assets path,
/// always in image syntax. Absolute https:// targets pass through.
pub fn rewrite_asset_links(markdown: &str, assets_path: &str) -> String {
    media_link_re()
        .replace_all(markdown, |caps: &Captures| {
            let text = &caps[2];
            let target = &caps[3];
            if target.starts_with("https://") {
                return caps[0].to_string();
            }
            format!(
                "![{}](/{}/{})",
                text,
                assets_path,
                target.trim_start_matches('/')
            )
        })
        .into_owned()
}

/// Replaces `{EMBED_<TYPE>_<KEY>}` tokens with iframes whose URLs come from
/// the matching `EMBED_<TYPE>_<KEY>` frontmatter property.
pub fn expand_embeds(markdown: &str) -> Result<String> {
    let re = embed_token_re();
    if !re.is_match(markdown) {
        return Ok(markdown.to_string());
    }

    let properties = frontmatter_properties(markdown)?;

    let mut out = String::with_capacity(markdown.len());
    let mut last = 0;
    for caps in re.captures_iter(markdown) {
        let token = caps.get(0).expect("regex match");
        let embed_type = &caps[1];
        let key = &caps[2];

        if embed_type != SUPPORTED_EMBED_TYPE {
            return Err(Error::Embed(format!(
                "Unsupported embed type {}",
                embed_type
            )));
        }

        let property = format!("EMBED_{}_{}", embed_type, key);
        let url = properties.get(&property).ok_or_else(|| {
            let available = properties
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            Error::Embed(format!(
                "Embed property {} not found. Available properties: {}",
                property, available
            ))
        })?;

        out.push_str(&markdown[last..token.start()]);
        out.push_str(&iframe_for(url));
        last = token.end();
    }
    out.push_str(&markdown[last..]);

    Ok(out)
}

fn iframe_for(url: &str) -> String {
    format!(
        "<iframe src=\"{}\"\n  style=\"width:100%; height:500px; border:0; border-radius: 4px; overflow:hidden;\"\n  allow=\"accelerometer; ambient-light-sensor; camera; encrypted-media; geolocation; gyroscope; hid; microphone; midi; payment; usb; vr; xr-spatial-tracking\"\n  sandbox=\"allow-forms allow-modals allow-popups allow-presentation allow-same-origin allow-scripts\"\n></iframe>",
        url
    )
}

/// Scalar frontmatter properties of a `---`-delimited document. Documents
/// without frontmatter yield an empty map.
fn frontmatter_properties(markdown: &str) -> Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();

    let Some(rest) = markdown.strip_prefix("---\n") else {
        return Ok(properties);
    };
    let Some(end) = rest.find("\n---\n") else {
        return Ok(properties);
    };

    let mapping: serde_yaml::Mapping = serde_yaml::from_str(&rest[..end])
        .map_err(|e| Error::Embed(format!("frontmatter is not valid YAML: {}", e)))?;

    for (key, value) in mapping {
        let Some(key) = key.as_str() else { continue };
        let value = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        properties.insert(key.to_string(), value);
    }

    Ok(properties)
}
