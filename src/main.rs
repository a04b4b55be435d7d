use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use taigazer::board::Loader;
use taigazer::remote::taiga::TaigaRemote;
use taigazer::{config, tui};

#[derive(Parser, Debug)]
#[command(name = "taigazer")]
#[command(about = "Terminal kanban board for Taiga projects")]
#[command(version)]
struct Args {
    /// Initialize configuration
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<std::path::PathBuf>,

    /// Sprint (milestone) id to open; overrides the configured default.
    /// Without a sprint the backlog is shown.
    #[arg(long, short)]
    sprint: Option<i64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the whole board once and print it to stdout
    Snapshot,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("taigazer=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if args.init {
        config::init_wizard().await?;
        return Ok(());
    }

    let config = config::load(args.config.as_deref())?;
    let sprint = args.sprint.or(config.board.sprint);
    let remote = TaigaRemote::from_config(&config);

    if let Some(Command::Snapshot) = args.command {
        return snapshot(remote, sprint).await;
    }

    // Run TUI
    tui::run(Arc::new(remote), sprint).await
}

/// One-shot board dump for non-interactive use (pipes, cron, scripts).
async fn snapshot(remote: TaigaRemote, sprint: Option<i64>) -> Result<()> {
    let mut loader = Loader::new(remote);
    loader.board.set_sprint(sprint);
    loader.load_all().await;

    if let Some(message) = loader.board.statuses.error() {
        anyhow::bail!("{}", message);
    }

    let statuses = loader
        .board
        .statuses
        .data()
        .cloned()
        .unwrap_or_default();

    for status in statuses {
        println!("{} ({})", status.name, loader.board.story_count_for(status.id));
        for story in loader.board.stories_for(status.id) {
            match &story.assignee {
                Some(assignee) => println!("  {}  [{}]", story.label(), assignee),
                None => println!("  {}", story.label()),
            }
        }
    }

    Ok(())
}
