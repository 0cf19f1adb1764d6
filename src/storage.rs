// ABOUTME: Output paths, directory creation, and post/asset writes
// ABOUTME: Reads loose frontmatter mappings from existing posts

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Where a run writes its output. `assets_path` is the link root relative to
/// the site root; the files themselves land under `static/<assets_path>`.
pub struct Paths {
    pub markdown_dir: PathBuf,
    pub assets_path: String,
    pub static_assets_dir: PathBuf,
}

impl Paths {
    pub fn new(markdown_dir: PathBuf, assets_path: &str) -> Self {
        let trimmed = assets_path.trim_matches('/').to_string();
        let static_assets_dir = Path::new("static").join(&trimmed);
        Paths {
            markdown_dir,
            assets_path: trimmed,
            static_assets_dir,
        }
    }

    /// Re-roots the `static/` output somewhere else (tests, odd site layouts).
    pub fn with_static_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.static_assets_dir = root.into().join(&self.assets_path);
        self
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.markdown_dir)?;
        Ok(())
    }

    pub fn post_path(&self, slug: &str) -> PathBuf {
        self.markdown_dir.join(format!("{}.md", slug))
    }

    /// Target for one asset out of an export bundle:
    /// `static/<assets_path>/<subfolder>/<filename>`.
    pub fn asset_path(&self, subfolder: &str, filename: &str) -> PathBuf {
        self.static_assets_dir.join(subfolder).join(filename)
    }
}

pub fn write_post(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    Ok(())
}

pub fn write_asset(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)?;
    Ok(())
}

/// Loose frontmatter of an existing post: any `---`-delimited YAML mapping.
/// `Ok(None)` means the file carries no frontmatter block at all.
pub fn read_frontmatter(md_path: &Path) -> Result<Option<serde_yaml::Mapping>> {
    let content = fs::read_to_string(md_path)?;

    let Some(rest) = content.strip_prefix("---\n") else {
        return Ok(None);
    };
    let Some(end) = rest.find("\n---\n") else {
        return Ok(None);
    };

    let mapping: serde_yaml::Mapping = serde_yaml::from_str(&rest[..end]).map_err(|e| {
        Error::LocalState(format!(
            "Failed to parse frontmatter of {}: {}",
            md_path.display(),
            e
        ))
    })?;

    Ok(Some(mapping))
}
