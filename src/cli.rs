use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Scriptpack - asset obfuscation cache
#[derive(Parser, Debug)]
#[command(name = "scriptpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./scriptpack.toml, then the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pack and substitute the scripts listed in an asset manifest
    Run {
        /// Path to the asset manifest JSON
        #[arg(short, long, default_value = "assets.json")]
        manifest: PathBuf,

        /// Report what would be packed without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete every cached artifact
    Purge {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show effective configuration and cache health
    Status,
}
