//! Transform pipeline - resolves eligible assets through the cache
//!
//! Per asset: consult the cache; on a miss read the original source, run the
//! packer, and fill the cache; then hand back a substitution pointing the
//! host at the cached artifact. Every per-asset failure degrades to serving
//! the original - a broken transform must never break page load. The one
//! global failure is an unwritable cache root, checked once per run.

use std::path::PathBuf;

use crate::cache::{CacheKey, CacheStore};
use crate::config::Settings;
use crate::filter::{self, Ineligibility};
use crate::models::{Asset, AssetRegistry, Substitution};
use crate::packer::Packer;
use crate::site::Site;

/// Why one asset was served as the original.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Filtered out before the cache was consulted
    Ineligible(Ineligibility),
    /// Src passed the filter but could not be mapped to the source tree
    UnresolvableSrc,
    /// Original source unreadable
    SourceRead { path: PathBuf, message: String },
    /// Packer failed or produced nothing usable
    PackFailed { message: String },
    /// Cache directory or artifact could not be written
    CacheWrite { message: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Ineligible(reason) => write!(f, "{}", reason),
            SkipReason::UnresolvableSrc => write!(f, "unresolvable src"),
            SkipReason::SourceRead { path, message } => {
                write!(f, "cannot read source {}: {}", path.display(), message)
            }
            SkipReason::PackFailed { message } => write!(f, "pack failed: {}", message),
            SkipReason::CacheWrite { message } => write!(f, "cache write failed: {}", message),
        }
    }
}

/// Terminal state for one asset.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Serve the cached artifact; `freshly_packed` is false on a cache hit
    Substituted {
        substitution: Substitution,
        freshly_packed: bool,
    },
    /// Dry run: a miss that would have been packed
    WouldPack,
    /// Serve the original
    Skipped(SkipReason),
}

/// A condition that stopped the whole run before any asset was touched.
#[derive(Debug, Clone, PartialEq)]
pub enum Disabled {
    /// The global gate is off
    NotEnabled,
    /// Nothing is allow-listed
    EmptyIncludeList,
    /// The cache root cannot be created or written; this one is an operator
    /// problem and is surfaced loudly
    CacheNotWritable,
}

impl std::fmt::Display for Disabled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Disabled::NotEnabled => "pipeline is disabled",
            Disabled::EmptyIncludeList => "include list is empty",
            Disabled::CacheNotWritable => "cache root is not writable",
        };
        write!(f, "{}", text)
    }
}

/// Result of one pipeline run over a registry snapshot.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Substitution instructions for the host, in registration order
    pub substitutions: Vec<Substitution>,
    /// Fresh cache fills this run
    pub packed: usize,
    /// Entries served straight from the cache
    pub hits: usize,
    /// Dry run: handles that would have been packed
    pub would_pack: Vec<String>,
    /// Assets served as originals, with reasons, in registration order
    pub skipped: Vec<(String, SkipReason)>,
    /// Set when the run stopped before touching any asset
    pub disabled: Option<Disabled>,
}

impl RunReport {
    fn stopped(reason: Disabled) -> Self {
        Self {
            disabled: Some(reason),
            ..Self::default()
        }
    }
}

/// The pipeline: decision logic over an injected cache store and packer.
pub struct Pipeline<C: CacheStore, P: Packer> {
    cache: C,
    packer: P,
    settings: Settings,
    site: Site,
}

impl<C: CacheStore, P: Packer> Pipeline<C, P> {
    pub fn new(cache: C, packer: P, settings: Settings, site: Site) -> Self {
        Self {
            cache,
            packer,
            settings,
            site,
        }
    }

    /// Process a whole registry snapshot in registration order.
    ///
    /// With `dry_run` set, cache hits still produce substitutions but misses
    /// are only counted; nothing is written and the writability gate is not
    /// consulted.
    pub fn run(&self, registry: &AssetRegistry, dry_run: bool) -> RunReport {
        if !self.settings.enable {
            return RunReport::stopped(Disabled::NotEnabled);
        }

        if self.settings.include.is_empty() {
            return RunReport::stopped(Disabled::EmptyIncludeList);
        }

        // one-time activation: the cache root must exist and be writable
        // before any asset is worth touching
        if !dry_run && (self.cache.ensure_dir("").is_err() || !self.cache.is_writable()) {
            return RunReport::stopped(Disabled::CacheNotWritable);
        }

        let mut report = RunReport::default();

        for asset in registry.assets() {
            let outcome = if let Some(reason) = filter::check(asset, &self.settings, &self.site) {
                Outcome::Skipped(SkipReason::Ineligible(reason))
            } else if dry_run {
                self.peek(asset)
            } else {
                self.process(asset)
            };

            match outcome {
                Outcome::Substituted {
                    substitution,
                    freshly_packed,
                } => {
                    if freshly_packed {
                        report.packed += 1;
                    } else {
                        report.hits += 1;
                    }
                    report.substitutions.push(substitution);
                }
                Outcome::WouldPack => report.would_pack.push(asset.handle.clone()),
                Outcome::Skipped(reason) => report.skipped.push((asset.handle.clone(), reason)),
            }
        }

        report
    }

    /// Resolve one eligible asset: cache hit, or read-pack-write on a miss.
    ///
    /// Eligibility is the caller's responsibility; `run` filters first.
    pub fn process(&self, asset: &Asset) -> Outcome {
        let location = match self.site.locate(&asset.src) {
            Some(location) => location,
            None => return Outcome::Skipped(SkipReason::UnresolvableSrc),
        };
        let key = CacheKey::from_location(&location);

        if self.cache.exists(&key) {
            return Outcome::Substituted {
                substitution: self.substitution(asset, &key),
                freshly_packed: false,
            };
        }

        if let Err(e) = self.cache.ensure_dir(&key.relative_dir) {
            return Outcome::Skipped(SkipReason::CacheWrite {
                message: e.to_string(),
            });
        }

        let source = match std::fs::read_to_string(&location.source_path) {
            Ok(source) => source,
            Err(e) => {
                return Outcome::Skipped(SkipReason::SourceRead {
                    path: location.source_path,
                    message: e.to_string(),
                })
            }
        };

        let packed = match self.packer.pack(&source, self.settings.mode) {
            Ok(packed) => packed,
            Err(e) => {
                return Outcome::Skipped(SkipReason::PackFailed {
                    message: e.to_string(),
                })
            }
        };

        // an empty artifact would load as a broken script; keep the original
        if packed.trim().is_empty() {
            return Outcome::Skipped(SkipReason::PackFailed {
                message: "packer produced empty output".to_string(),
            });
        }

        if let Err(e) = self.cache.write(&key, packed.as_bytes()) {
            return Outcome::Skipped(SkipReason::CacheWrite {
                message: e.to_string(),
            });
        }

        Outcome::Substituted {
            substitution: self.substitution(asset, &key),
            freshly_packed: true,
        }
    }

    /// Dry-run resolution: hit substitutions only, no writes
    fn peek(&self, asset: &Asset) -> Outcome {
        let location = match self.site.locate(&asset.src) {
            Some(location) => location,
            None => return Outcome::Skipped(SkipReason::UnresolvableSrc),
        };
        let key = CacheKey::from_location(&location);

        if self.cache.exists(&key) {
            Outcome::Substituted {
                substitution: self.substitution(asset, &key),
                freshly_packed: false,
            }
        } else {
            Outcome::WouldPack
        }
    }

    fn substitution(&self, asset: &Asset, key: &CacheKey) -> Substitution {
        let src = format!("{}/{}", self.site.cache_url(), key.relative_url());
        Substitution::for_asset(asset, src)
    }
}
