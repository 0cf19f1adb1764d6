// ABOUTME: CLI entrypoint for the notedown command
// ABOUTME: Resolves secrets before any I/O and maps errors to exit codes

use clap::Parser;
use notedown::{
    api::NotionClient,
    auth::{self, Secrets},
    cli::Cli,
    export::Exporter,
    storage::Paths,
    sync::{sync_all, SyncConfig},
    Result,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("notedown: [E{}] {}", e.exit_code(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let secrets = Secrets::from_env()?;

    let client = NotionClient::new(secrets.integration_token, None)?;
    let exporter = Exporter::new(secrets.session_token, None)?;
    let paths = Paths::new(cli.markdown_dir_path, &cli.notion_assets_dir_path);

    let config = SyncConfig {
        database_id: cli.notion_blog_db_id,
        published_only: !auth::dev_mode(),
    };

    let summary = sync_all(&client, &exporter, &paths, &config)?;
    print!("{}", summary.render(&paths.markdown_dir));

    Ok(())
}
