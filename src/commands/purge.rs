//! `scriptpack purge` - delete every cached artifact
//!
//! The cache is fully rebuildable, so the only cost of a purge is
//! recompilation on the next run. Still destructive enough to confirm first.

use std::path::Path;

use anyhow::{bail, Result};
use dialoguer::Confirm;
use is_terminal::IsTerminal;

use scriptpack::{CacheStore, DiskCache, Settings};

pub fn execute(yes: bool, config: Option<&Path>, json: bool) -> Result<()> {
    let loaded = Settings::discover(config)?;
    let site = loaded.settings.site()?;
    let root = site.cache_root();
    let cache = DiskCache::new(&root);

    if !yes {
        if !std::io::stdin().is_terminal() {
            bail!("refusing to purge without confirmation; pass --yes to proceed");
        }

        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete every cached artifact under {}?",
                root.display()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Purge aborted.");
            return Ok(());
        }
    }

    let report = cache.purge()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Removed {} files and {} directories from {}",
            report.removed_files,
            report.removed_dirs,
            root.display()
        );
        for failure in &report.failures {
            eprintln!(
                "failed to remove {}: {}",
                failure.path.display(),
                failure.message
            );
        }
    }

    if !report.is_clean() {
        bail!(
            "purge incomplete: {} entries could not be removed",
            report.failures.len()
        );
    }

    Ok(())
}
