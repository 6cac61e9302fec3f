//! Site context - origin checks and mapping asset URLs onto the local tree
//!
//! The cache mirrors the source tree: an asset served from
//! `https://example.com/themes/shop/js/app.js` is cached under
//! `<uploads>/obfuscated_scripts/themes/shop/js/app.js` and served from the
//! matching uploads URL.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{ScriptpackError, ScriptpackResult};

/// Directory under the uploads root holding every cached artifact
pub const CACHE_DIR_NAME: &str = "obfuscated_scripts";

/// The site the pipeline runs against: its origin, docroot, and uploads area.
#[derive(Debug, Clone)]
pub struct Site {
    url: Url,
    root: PathBuf,
    uploads_dir: PathBuf,
    uploads_url: String,
}

impl Site {
    /// Build a site context; fails when the site URL has no usable host
    pub fn new(
        site_url: &str,
        root: impl Into<PathBuf>,
        uploads_dir: impl Into<PathBuf>,
        uploads_url: impl Into<String>,
    ) -> ScriptpackResult<Self> {
        let url = Url::parse(site_url).map_err(|e| ScriptpackError::InvalidSiteUrl {
            url: site_url.to_string(),
            message: e.to_string(),
        })?;

        if url.host_str().is_none() {
            return Err(ScriptpackError::InvalidSiteUrl {
                url: site_url.to_string(),
                message: "missing host".to_string(),
            });
        }

        let uploads_url = uploads_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            url,
            root: root.into(),
            uploads_dir: uploads_dir.into(),
            uploads_url,
        })
    }

    /// The site's host name
    pub fn host(&self) -> &str {
        // checked in new()
        self.url.host_str().unwrap_or_default()
    }

    /// Filesystem docroot asset URL paths resolve against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory all cached artifacts live under
    pub fn cache_root(&self) -> PathBuf {
        self.uploads_dir.join(CACHE_DIR_NAME)
    }

    /// URL prefix cached artifacts are served from (no trailing slash)
    pub fn cache_url(&self) -> String {
        format!("{}/{}", self.uploads_url, CACHE_DIR_NAME)
    }

    /// Whether a src URL is absolute, carries an explicit scheme, and points
    /// at this site's host. Scheme-relative and relative srcs never match.
    pub fn same_origin(&self, src: &str) -> bool {
        match Url::parse(src) {
            Ok(url) => url.host_str() == Some(self.host()),
            Err(_) => false,
        }
    }

    /// Resolve a same-origin src URL to its place in the source tree.
    ///
    /// Returns `None` for srcs that do not parse as absolute URLs or whose
    /// path has no usable basename.
    pub fn locate(&self, src: &str) -> Option<AssetLocation> {
        let url = Url::parse(src).ok()?;
        let path = url.path();

        let (dir, basename) = match path.rsplit_once('/') {
            Some((dir, basename)) => (dir.trim_start_matches('/'), basename),
            None => ("", path),
        };

        if basename.is_empty() {
            return None;
        }

        let extension = match basename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_string()),
            _ => None,
        };

        let source_path = self.root.join(path.trim_start_matches('/'));

        Some(AssetLocation {
            relative_dir: dir.to_string(),
            filename: basename.to_string(),
            extension,
            source_path,
        })
    }
}

/// Where one asset lives: its URL path split into the cache key parts, plus
/// the local filesystem path of the original source.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetLocation {
    /// URL directory with the leading slash stripped; empty for root-level assets
    pub relative_dir: String,

    /// URL basename, also the cached artifact's filename
    pub filename: String,

    /// Extension without the dot, `None` when the basename has none
    pub extension: Option<String>,

    /// Path of the original source under the site docroot
    pub source_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site {
        Site::new(
            "https://example.com",
            "/srv/site",
            "/srv/site/uploads",
            "https://example.com/uploads",
        )
        .unwrap()
    }

    #[test]
    fn site_requires_host() {
        let err = Site::new("not a url", "/srv", "/srv/uploads", "https://x/uploads")
            .unwrap_err();
        assert!(err.to_string().contains("invalid site URL"));

        // data: URLs parse but have no host
        let err = Site::new("data:text/plain,hi", "/srv", "/srv/uploads", "https://x/u")
            .unwrap_err();
        assert!(err.to_string().contains("missing host"));
    }

    #[test]
    fn cache_root_and_url_share_the_layout() {
        let site = site();
        assert_eq!(
            site.cache_root(),
            PathBuf::from("/srv/site/uploads/obfuscated_scripts")
        );
        assert_eq!(
            site.cache_url(),
            "https://example.com/uploads/obfuscated_scripts"
        );
    }

    #[test]
    fn same_origin_matches_host_only() {
        let site = site();
        assert!(site.same_origin("https://example.com/js/app.js"));
        assert!(site.same_origin("http://example.com/js/app.js"));
        assert!(!site.same_origin("https://cdn.example.net/js/app.js"));
    }

    #[test]
    fn scheme_relative_and_relative_srcs_are_not_same_origin() {
        let site = site();
        assert!(!site.same_origin("//example.com/js/app.js"));
        assert!(!site.same_origin("/js/app.js"));
        assert!(!site.same_origin("js/app.js"));
    }

    #[test]
    fn locate_splits_dir_and_basename() {
        let site = site();
        let loc = site
            .locate("https://example.com/themes/shop/js/app.js?v=2")
            .unwrap();
        assert_eq!(loc.relative_dir, "themes/shop/js");
        assert_eq!(loc.filename, "app.js");
        assert_eq!(loc.extension.as_deref(), Some("js"));
        assert_eq!(
            loc.source_path,
            PathBuf::from("/srv/site/themes/shop/js/app.js")
        );
    }

    #[test]
    fn locate_root_level_asset_has_empty_relative_dir() {
        let site = site();
        let loc = site.locate("https://example.com/app.js").unwrap();
        assert_eq!(loc.relative_dir, "");
        assert_eq!(loc.filename, "app.js");
    }

    #[test]
    fn locate_without_extension() {
        let site = site();
        let loc = site.locate("https://example.com/js/LICENSE").unwrap();
        assert_eq!(loc.extension, None);

        // a dotfile is not an extension
        let loc = site.locate("https://example.com/js/.hidden").unwrap();
        assert_eq!(loc.extension, None);
    }

    #[test]
    fn locate_normalizes_dot_segments() {
        let site = site();
        let loc = site
            .locate("https://example.com/js/../js/app.js")
            .unwrap();
        assert_eq!(loc.relative_dir, "js");
        assert_eq!(loc.source_path, PathBuf::from("/srv/site/js/app.js"));
    }

    #[test]
    fn locate_rejects_directory_srcs() {
        let site = site();
        assert!(site.locate("https://example.com/js/").is_none());
    }
}
