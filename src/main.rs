//! Scriptpack CLI - asset obfuscation cache
//!
//! Usage: scriptpack <COMMAND>
//!
//! Commands:
//!   run     Pack and substitute the scripts listed in an asset manifest
//!   purge   Delete every cached artifact
//!   status  Show effective configuration and cache health

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { manifest, dry_run } => commands::run::execute(
            &manifest,
            dry_run,
            cli.config.as_deref(),
            cli.json,
            cli.verbose,
        ),
        Commands::Purge { yes } => commands::purge::execute(yes, cli.config.as_deref(), cli.json),
        Commands::Status => commands::status::execute(cli.config.as_deref(), cli.json),
    }
}
