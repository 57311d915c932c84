//! BibleCloud - a personal Bible-reading tracker.
//!
//! This is the entry point for the web server and the account tool.
//! The application is organized into the following modules:
//!
//! - `catalog`, `search`, `normalize`: the static chapter list and searching it
//! - `store`, `reading`: per-user reading history and notes
//! - `confirm`, `session`: mark-unread confirmation and per-request auth state
//! - `auth`: accounts, password checks and signed session cookies
//! - `handlers`, `templates`: HTTP routes and HTML

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser as _;

use biblecloud::cli::{AddUserArgs, Cli, Command, ServeArgs};
use biblecloud::config::Config;
use biblecloud::{logging, router, AppState};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        Command::Serve(args) => serve(args).await.context("serve"),
        Command::AddUser(args) => add_user(args).context("add-user"),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = Config::from_env().with_overrides(args.addr, args.db, args.catalog);
    let state = Arc::new(AppState::open(&config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;

    tracing::info!(addr = %config.addr, db = %config.db_path.display(), "BibleCloud running");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn add_user(args: AddUserArgs) -> anyhow::Result<()> {
    let config = Config::from_env().with_overrides(None, args.db, None);
    let account = biblecloud::add_user(&config, &args.email, &args.password)?;

    println!("Created {} ({})", account.email, account.uid);
    Ok(())
}
