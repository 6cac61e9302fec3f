//! Scriptpack - asset obfuscation cache
//!
//! Scriptpack intercepts the JavaScript a site is about to serve, runs the
//! allow-listed files through an external packer, caches the packed result
//! under the uploads directory, and hands back substitution instructions so
//! the host serves the cached artifact instead of the original.
//!
//! The cache mirrors the source tree and is keyed by path, not content: a
//! source edit does not invalidate its entry, only an explicit purge does.

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod packer;
pub mod pipeline;
pub mod site;

// Re-exports for convenience
pub use cache::{CacheKey, CacheStore, DiskCache, PurgeReport};
pub use config::{IncludeList, LoadedSettings, Settings};
pub use error::{ScriptpackError, ScriptpackResult};
pub use filter::{Ineligibility, RESERVED_PATH_PREFIXES};
pub use models::{Asset, AssetRegistry, Substitution};
pub use packer::{CommandPacker, EncodingMode, PackError, Packer};
pub use pipeline::{Disabled, Outcome, Pipeline, RunReport, SkipReason};
pub use site::{Site, CACHE_DIR_NAME};
