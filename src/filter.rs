//! Eligibility filter - decides which registered scripts the pipeline may touch
//!
//! Everything here is deny-by-default: a script is only eligible when the
//! pipeline is enabled, the script is a same-origin `.js` file outside the
//! platform-reserved paths, and its basename is explicitly allow-listed.

use crate::config::Settings;
use crate::models::Asset;
use crate::site::Site;

/// Path fragments owned by the platform itself; scripts under these are
/// never touched, whatever the allow-list says.
pub const RESERVED_PATH_PREFIXES: [&str; 2] = ["/wp-includes/", "/wp-admin/"];

/// Why an asset was left untouched by the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// The global gate is off
    PipelineDisabled,
    /// No basenames are allow-listed, so nothing can match
    EmptyIncludeList,
    /// Script lives under a platform-reserved path
    ReservedPath,
    /// Not a `.js` file (or no resolvable extension)
    NotAScript,
    /// Cross-origin, scheme-relative, or otherwise unresolvable src
    CrossOrigin,
    /// Basename not on the allow-list
    NotIncluded,
}

impl std::fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Ineligibility::PipelineDisabled => "pipeline disabled",
            Ineligibility::EmptyIncludeList => "include list is empty",
            Ineligibility::ReservedPath => "platform-reserved path",
            Ineligibility::NotAScript => "not a .js file",
            Ineligibility::CrossOrigin => "cross-origin src",
            Ineligibility::NotIncluded => "not on the include list",
        };
        write!(f, "{}", text)
    }
}

/// Check one asset; `None` means eligible.
pub fn check(asset: &Asset, settings: &Settings, site: &Site) -> Option<Ineligibility> {
    if !settings.enable {
        return Some(Ineligibility::PipelineDisabled);
    }

    if settings.include.is_empty() {
        return Some(Ineligibility::EmptyIncludeList);
    }

    if RESERVED_PATH_PREFIXES
        .iter()
        .any(|prefix| asset.src.contains(prefix))
    {
        return Some(Ineligibility::ReservedPath);
    }

    if !site.same_origin(&asset.src) {
        return Some(Ineligibility::CrossOrigin);
    }

    let location = match site.locate(&asset.src) {
        Some(location) => location,
        None => return Some(Ineligibility::CrossOrigin),
    };

    if location.extension.as_deref() != Some("js") {
        return Some(Ineligibility::NotAScript);
    }

    if !settings.include.contains(&location.filename) {
        return Some(Ineligibility::NotIncluded);
    }

    None
}

/// The ordered subset of assets eligible for packing.
pub fn filter<'a>(assets: &'a [Asset], settings: &Settings, site: &Site) -> Vec<&'a Asset> {
    assets
        .iter()
        .filter(|asset| check(asset, settings, site).is_none())
        .collect()
}

/// Split assets into the eligible subset and the skipped remainder with
/// reasons, both in registration order.
pub fn partition<'a>(
    assets: &'a [Asset],
    settings: &Settings,
    site: &Site,
) -> (Vec<&'a Asset>, Vec<(&'a Asset, Ineligibility)>) {
    let mut eligible = Vec::new();
    let mut skipped = Vec::new();

    for asset in assets {
        match check(asset, settings, site) {
            None => eligible.push(asset),
            Some(reason) => skipped.push((asset, reason)),
        }
    }

    (eligible, skipped)
}
