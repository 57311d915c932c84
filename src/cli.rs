use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server.
    Serve(ServeArgs),
    /// Create a login account.
    AddUser(AddUserArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides BIBLECLOUD_ADDR).
    #[arg(long)]
    pub addr: Option<String>,

    /// Database directory (overrides BIBLECLOUD_DB).
    #[arg(long)]
    pub db: Option<String>,

    /// Chapter catalog JSON (overrides BIBLECLOUD_CATALOG).
    #[arg(long)]
    pub catalog: Option<String>,
}

#[derive(Debug, Args)]
pub struct AddUserArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    /// Database directory (overrides BIBLECLOUD_DB).
    #[arg(long)]
    pub db: Option<String>,
}
