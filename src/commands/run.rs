//! `scriptpack run` - process an asset manifest through the pipeline

use std::path::Path;

use anyhow::Result;

use scriptpack::{
    AssetRegistry, CommandPacker, Disabled, DiskCache, Pipeline, RunReport, Settings,
};

pub fn execute(
    manifest: &Path,
    dry_run: bool,
    config: Option<&Path>,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let loaded = Settings::discover(config)?;
    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    let settings = loaded.settings;
    let site = settings.site()?;
    let cache_root = site.cache_root();

    let registry = AssetRegistry::load(manifest)?;

    if settings.enable && !dry_run && !settings.packer.is_configured() {
        eprintln!("warning: packer.command is not set; cache misses will be served as originals");
    }

    let cache = DiskCache::new(&cache_root);
    let packer = CommandPacker::new(settings.packer.command.clone(), settings.packer.args.clone());
    let pipeline = Pipeline::new(cache, packer, settings, site);

    let report = pipeline.run(&registry, dry_run);

    // misconfiguration, not a per-asset hiccup: keep warning until fixed
    if report.disabled == Some(Disabled::CacheNotWritable) {
        eprintln!(
            "warning: cache root {} is not writable; every script is served unpacked until this is fixed",
            cache_root.display()
        );
    }

    if json {
        print_json(&report, dry_run)?;
    } else {
        print_text(&report, dry_run, verbose);
    }

    // per-asset degradation must not fail the run; the originals still load
    Ok(())
}

fn print_json(report: &RunReport, dry_run: bool) -> Result<()> {
    let skipped: Vec<serde_json::Value> = report
        .skipped
        .iter()
        .map(|(handle, reason)| {
            serde_json::json!({
                "handle": handle,
                "reason": reason.to_string(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "dry_run": dry_run,
        "disabled": report.disabled.as_ref().map(|d| d.to_string()),
        "packed": report.packed,
        "hits": report.hits,
        "substitutions": &report.substitutions,
        "would_pack": &report.would_pack,
        "skipped": skipped,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(report: &RunReport, dry_run: bool, verbose: u8) {
    if let Some(reason) = &report.disabled {
        println!("Nothing to do: {}", reason);
        return;
    }

    for sub in &report.substitutions {
        println!("{} -> {}", sub.handle, sub.src);
    }

    for handle in &report.would_pack {
        println!("{} (would pack)", handle);
    }

    if verbose > 0 {
        for (handle, reason) in &report.skipped {
            println!("skipped {}: {}", handle, reason);
        }
    }

    let label = if dry_run { "dry run: " } else { "" };
    println!(
        "{}{} substituted ({} packed, {} cache hits), {} skipped",
        label,
        report.substitutions.len(),
        report.packed,
        report.hits,
        report.skipped.len()
    );
}
