//! Core data models for scriptpack
//!
//! Defines the structures exchanged with the host asset pipeline:
//! - `Asset`: one script the host intends to serve
//! - `AssetRegistry`: the ordered snapshot of scripts for one page load
//! - `Substitution`: the instruction to re-register a script from the cache

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ScriptpackError, ScriptpackResult};

/// One script the host intends to serve.
///
/// Read-only to the pipeline; only the final substitution step replaces the
/// source URL, and it preserves everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique name within one page-load's registry
    pub handle: String,

    /// Source URL as registered by the host
    pub src: String,

    /// Version tag appended by the host when serving
    #[serde(default)]
    pub version: Option<String>,

    /// Handles this script depends on, in load order
    #[serde(default)]
    pub deps: Vec<String>,

    /// Extra load attributes (defer/async flags and the like)
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Asset {
    /// Create a new asset with just a handle and source URL
    pub fn new(handle: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            src: src.into(),
            version: None,
            deps: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Set the version tag
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the dependency handles
    pub fn with_deps(mut self, deps: Vec<String>) -> Self {
        self.deps = deps;
        self
    }
}

/// Ordered snapshot of the scripts registered for one page load.
///
/// Handles are unique; a manifest carrying the same handle twice is rejected
/// at load time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AssetRegistry {
    assets: Vec<Asset>,
}

impl AssetRegistry {
    /// Build a registry, enforcing handle uniqueness
    pub fn new(assets: Vec<Asset>) -> ScriptpackResult<Self> {
        let mut seen = std::collections::BTreeSet::new();
        for asset in &assets {
            if !seen.insert(asset.handle.as_str()) {
                return Err(ScriptpackError::DuplicateHandle {
                    handle: asset.handle.clone(),
                });
            }
        }
        Ok(Self { assets })
    }

    /// Parse a registry from manifest JSON (an array of assets)
    pub fn from_json_str(json: &str, file: &Path) -> ScriptpackResult<Self> {
        let assets: Vec<Asset> =
            serde_json::from_str(json).map_err(|e| ScriptpackError::InvalidManifest {
                file: file.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::new(assets)
    }

    /// Load a registry from a manifest file on disk
    pub fn load(path: &Path) -> ScriptpackResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content, path)
    }

    /// The assets, in registration order
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Instruction to replace an asset's registration with its cached artifact.
///
/// The host is expected to deregister `handle` and register it again with
/// `src`, keeping the dependency list, version, and extra attributes intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    pub handle: String,

    /// The URL the host originally registered
    pub original_src: String,

    /// The cached artifact URL to load instead
    pub src: String,

    pub deps: Vec<String>,
    pub version: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl Substitution {
    /// Build the substitution for an asset, pointing it at the cached URL
    pub fn for_asset(asset: &Asset, cache_src: impl Into<String>) -> Self {
        Self {
            handle: asset.handle.clone(),
            original_src: asset.src.clone(),
            src: cache_src.into(),
            deps: asset.deps.clone(),
            version: asset.version.clone(),
            extra: asset.extra.clone(),
        }
    }
}
