//! valleydocs CLI: scrape The Living Valley documentation site.
//!
//! Crawls the site's docs, normalizes each page into the structured tag
//! model, and writes resource records, narration transcripts and
//! diagnostic dumps.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
