// ABOUTME: Command-line interface definitions using clap
// ABOUTME: Three required flags; secrets come from the environment

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notedown")]
#[command(about = "Sync a Notion blog database into markdown posts for a static site", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the Notion assets directory relative to your website root.
    /// Embedded images and videos are rewritten to live under it.
    #[arg(short = 'p', long)]
    pub notion_assets_dir_path: String,

    /// Directory (relative to the current dir) where posts are written as markdown
    #[arg(short = 'm', long)]
    pub markdown_dir_path: PathBuf,

    /// Notion database ID holding the blog posts
    #[arg(short = 'i', long)]
    pub notion_blog_db_id: String,
}
