//! Folio CLI: maintenance tooling for the illustration portfolio.
//!
//! Backfills artwork entries from uploaded images, previews the published
//! gallery, and sends contact-form messages through the email relay.

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
