mod catalog;
mod cli;
mod engine;
mod model;
mod numeric;
mod orchestrator;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_non_tui = args.json || args.text;

    cli::run(args).await?;
    // Headless modes exit right away instead of waiting on lingering engine tasks.
    if is_non_tui {
        std::process::exit(0);
    }
    Ok(())
}
