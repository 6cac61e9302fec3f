//! `scriptpack status` - effective configuration and cache health

use std::path::Path;

use anyhow::Result;
use ignore::WalkBuilder;

use scriptpack::{CacheStore, DiskCache, ScriptpackError, Settings};

pub fn execute(config: Option<&Path>, json: bool) -> Result<()> {
    let loaded = Settings::discover(config)?;
    let settings = &loaded.settings;
    let site = settings.site()?;
    let root = site.cache_root();
    let cache = DiskCache::new(&root);

    let root_exists = root.is_dir();
    let writable = cache.is_writable();
    let (cached_files, cached_bytes) = if root_exists {
        count_artifacts(&root)
    } else {
        (0, 0)
    };

    if json {
        let output = serde_json::json!({
            "config_file": &loaded.source,
            "warnings": loaded.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
            "enable": settings.enable,
            "include": settings.include.as_slice(),
            "mode": settings.mode,
            "mode_name": settings.mode.display_name(),
            "packer_configured": settings.packer.is_configured(),
            "site_url": &settings.site.url,
            "cache_root": &root,
            "cache_root_exists": root_exists,
            "writable": writable,
            "cached_files": cached_files,
            "cached_bytes": cached_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &loaded.source {
            Some(path) => println!("Config:  {}", path.display()),
            None => println!("Config:  (built-in defaults)"),
        }
        for warning in &loaded.warnings {
            eprintln!("warning: {}", warning);
        }

        println!("Enabled: {}", if settings.enable { "yes" } else { "no" });
        if settings.include.is_empty() {
            println!("Include: (empty - nothing will be packed)");
        } else {
            println!("Include: {}", settings.include);
        }
        println!(
            "Mode:    {} ({})",
            settings.mode.display_name(),
            settings.mode.level()
        );
        if settings.packer.is_configured() {
            println!("Packer:  {}", settings.packer.command);
        } else {
            println!("Packer:  (not configured)");
        }
        println!("Site:    {}", settings.site.url);
        println!("Cache:   {}", root.display());

        if root_exists {
            println!(
                "         {} artifacts, {} bytes{}",
                cached_files,
                cached_bytes,
                if writable { "" } else { " - NOT WRITABLE" }
            );
        } else {
            println!("         (missing; created on first run)");
        }
    }

    if root_exists && !writable {
        return Err(ScriptpackError::CacheNotWritable { root }.into());
    }

    Ok(())
}

fn count_artifacts(root: &Path) -> (usize, u64) {
    let mut files = 0;
    let mut bytes = 0;

    for entry in WalkBuilder::new(root).standard_filters(false).build().flatten() {
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            files += 1;
            bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }

    (files, bytes)
}
