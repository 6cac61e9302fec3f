//! Configuration module for scriptpack
//!
//! Settings resolution order:
//! 1. `SCRIPTPACK_*` environment variables (highest priority)
//! 2. Site config (`scriptpack.toml` in the working directory, or `--config`)
//! 3. User config (`~/.config/scriptpack/config.toml`)
//! 4. Built-in defaults (lowest priority)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ScriptpackError, ScriptpackResult};
use crate::packer::EncodingMode;
use crate::site::Site;

/// Default site config filename looked up in the working directory
pub const SITE_CONFIG_FILE: &str = "scriptpack.toml";

/// Allow-list of script basenames eligible for packing.
///
/// Accepts both the comma-separated wire form:
///   include = "app.js, checkout.js"
///
/// And a plain list:
///   include = ["app.js", "checkout.js"]
///
/// Entries are trimmed and empties dropped, so an all-whitespace string means
/// an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncludeList(Vec<String>);

impl IncludeList {
    /// Parse the comma-separated wire form
    pub fn parse(value: &str) -> Self {
        Self::from_entries(value.split(',').map(str::to_string).collect())
    }

    fn from_entries(entries: Vec<String>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    /// Exact-match lookup by basename
    pub fn contains(&self, basename: &str) -> bool {
        self.0.iter().any(|e| e == basename)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for IncludeList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IncludeListDe {
    Text(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for IncludeList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match IncludeListDe::deserialize(deserializer)? {
            IncludeListDe::Text(text) => IncludeList::parse(&text),
            IncludeListDe::List(entries) => IncludeList::from_entries(entries),
        })
    }
}

/// Site configuration: origin, docroot, and uploads area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site origin URL; only same-origin scripts are ever touched
    #[serde(default = "default_site_url")]
    pub url: String,

    /// Filesystem docroot; asset URL paths are read relative to it
    #[serde(default = "default_site_root")]
    pub root: PathBuf,

    /// Uploads base directory; defaults to `<root>/uploads`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploads_dir: Option<PathBuf>,

    /// Uploads base URL; defaults to `<url>/uploads`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploads_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            root: default_site_root(),
            uploads_dir: None,
            uploads_url: None,
        }
    }
}

fn default_site_url() -> String {
    "http://localhost".to_string()
}

fn default_site_root() -> PathBuf {
    PathBuf::from(".")
}

/// External packer command line
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackerConfig {
    /// Command to run; empty means no packer is configured
    #[serde(default)]
    pub command: String,

    /// Arguments placed before the encoding level
    #[serde(default)]
    pub args: Vec<String>,
}

impl PackerConfig {
    pub fn is_configured(&self) -> bool {
        !self.command.trim().is_empty()
    }
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())
    }
}

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Global gate; nothing runs while this is off
    #[serde(default)]
    pub enable: bool,

    /// Allow-list of basenames; empty means the pipeline is a no-op
    #[serde(default)]
    pub include: IncludeList,

    /// Packer encoding strength
    #[serde(default)]
    pub mode: EncodingMode,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub packer: PackerConfig,
}

/// Settings together with where they came from.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub warnings: Vec<ConfigWarning>,
    /// Config file actually read, if any
    pub source: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> ScriptpackResult<Self> {
        let (settings, _warnings) = Self::load_with_warnings(path)?;
        Ok(settings)
    }

    /// Load settings and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> ScriptpackResult<(Self, Vec<ConfigWarning>)> {
        let content = fs::read_to_string(path)?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);

        let settings: Self = serde_ignored::deserialize(deserializer, |key| {
            unknown_paths.push(key.to_string());
        })
        .map_err(|e| ScriptpackError::InvalidConfig {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_paths
            .into_iter()
            .map(|key| ConfigWarning {
                key,
                file: path.to_path_buf(),
            })
            .collect();

        Ok((settings, warnings))
    }

    /// Resolve settings through the config hierarchy.
    ///
    /// An explicit path is authoritative and its errors are fatal; the
    /// discovered site and user configs are skipped when unreadable.
    pub fn discover(explicit: Option<&Path>) -> ScriptpackResult<LoadedSettings> {
        if let Some(path) = explicit {
            let (settings, warnings) = Self::load_with_warnings(path)?;
            return Ok(LoadedSettings {
                settings: settings.with_env_overrides(),
                warnings,
                source: Some(path.to_path_buf()),
            });
        }

        let site_config = PathBuf::from(SITE_CONFIG_FILE);
        if site_config.exists() {
            if let Ok((settings, warnings)) = Self::load_with_warnings(&site_config) {
                return Ok(LoadedSettings {
                    settings: settings.with_env_overrides(),
                    warnings,
                    source: Some(site_config),
                });
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("scriptpack/config.toml");
            if user_config.exists() {
                if let Ok((settings, warnings)) = Self::load_with_warnings(&user_config) {
                    return Ok(LoadedSettings {
                        settings: settings.with_env_overrides(),
                        warnings,
                        source: Some(user_config),
                    });
                }
            }
        }

        Ok(LoadedSettings {
            settings: Self::default().with_env_overrides(),
            warnings: Vec::new(),
            source: None,
        })
    }

    /// Apply environment variable overrides (SCRIPTPACK_* prefix)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(enable) = std::env::var("SCRIPTPACK_ENABLE") {
            self.enable = parse_switch(&enable).unwrap_or(self.enable);
        }

        if let Ok(include) = std::env::var("SCRIPTPACK_INCLUDE") {
            self.include = IncludeList::parse(&include);
        }

        if let Ok(mode) = std::env::var("SCRIPTPACK_MODE") {
            self.mode = EncodingMode::parse_lossy(&mode);
        }

        if let Ok(url) = std::env::var("SCRIPTPACK_SITE_URL") {
            self.site.url = url;
        }

        if let Ok(root) = std::env::var("SCRIPTPACK_SITE_ROOT") {
            self.site.root = PathBuf::from(root);
        }

        if let Ok(command) = std::env::var("SCRIPTPACK_PACKER_COMMAND") {
            self.packer.command = command;
        }

        self
    }

    /// Effective uploads directory
    pub fn uploads_dir(&self) -> PathBuf {
        self.site
            .uploads_dir
            .clone()
            .unwrap_or_else(|| self.site.root.join("uploads"))
    }

    /// Effective uploads base URL
    pub fn uploads_url(&self) -> String {
        self.site
            .uploads_url
            .clone()
            .unwrap_or_else(|| format!("{}/uploads", self.site.url.trim_end_matches('/')))
    }

    /// Build the site context these settings describe
    pub fn site(&self) -> ScriptpackResult<Site> {
        Site::new(
            &self.site.url,
            self.site.root.clone(),
            self.uploads_dir(),
            self.uploads_url(),
        )
    }
}

/// Parse on/off style switches ("on", "true", "1" / "off", "false", "0")
fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
