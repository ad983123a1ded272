//! Command-line interface for FRED question answering

mod app;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    fred_utils::init_tracing(&cli.global.log_level, cli.global.log_format);

    info!(provider = ?cli.global.provider, "Starting fred-qa");

    match cli.command {
        Command::Ask(args) => commands::ask(&cli.global, args).await,
        Command::Fetch(args) => commands::fetch(&cli.global, args).await,
        Command::Analyze(args) => commands::analyze(&cli.global, &args),
        Command::Eval(args) => commands::eval(&cli.global, args).await,
    }
}
