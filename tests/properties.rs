//! Property tests for the eligibility filter and URL-to-cache mapping.

use proptest::prelude::*;

use scriptpack::config::IncludeList;
use scriptpack::filter::{self, Ineligibility};
use scriptpack::{Asset, Settings, Site};

fn site() -> Site {
    Site::new(
        "https://example.com",
        "/srv/site",
        "/srv/site/uploads",
        "https://example.com/uploads",
    )
    .unwrap()
}

fn settings(include: IncludeList) -> Settings {
    Settings {
        enable: true,
        include,
        ..Settings::default()
    }
}

/// Asset generator covering eligible and every ineligible shape
fn any_asset(index: usize, kind: u8, name: String) -> Asset {
    let handle = format!("{name}-{index}");
    let src = match kind {
        0 => format!("https://example.com/js/{name}.js"),
        1 => format!("https://cdn.example.net/js/{name}.js"),
        2 => format!("https://example.com/wp-includes/js/{name}.js"),
        3 => format!("https://example.com/css/{name}.css"),
        _ => format!("/js/{name}.js"),
    };
    Asset::new(handle, src)
}

proptest! {
    #[test]
    fn filter_returns_an_ordered_subset(
        shapes in prop::collection::vec(("[a-z]{1,8}", 0u8..5), 0..24)
    ) {
        let assets: Vec<Asset> = shapes
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| any_asset(i, *kind, name.clone()))
            .collect();

        // allow-list every basename so only the structural checks decide
        let include = IncludeList::parse(
            &shapes
                .iter()
                .map(|(name, _)| format!("{name}.js"))
                .collect::<Vec<_>>()
                .join(","),
        );
        let settings = settings(include);

        let eligible = filter::filter(&assets, &settings, &site());

        // subset: every eligible asset is same-origin plain js
        for asset in &eligible {
            prop_assert!(asset.src.starts_with("https://example.com/js/"));
            prop_assert!(asset.src.ends_with(".js"));
        }

        // order: eligible handles appear in input order
        let input_order: Vec<&str> = assets.iter().map(|a| a.handle.as_str()).collect();
        let positions: Vec<usize> = eligible
            .iter()
            .map(|a| input_order.iter().position(|h| *h == a.handle).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn reserved_paths_are_never_eligible(name in "[a-z]{1,10}") {
        let asset = Asset::new("a", format!("https://example.com/wp-includes/js/{name}.js"));
        let include = IncludeList::parse(&format!("{name}.js"));
        prop_assert_eq!(
            filter::check(&asset, &settings(include), &site()),
            Some(Ineligibility::ReservedPath)
        );
    }

    #[test]
    fn cross_origin_hosts_are_never_eligible(host in "[a-z]{1,10}\\.net") {
        let asset = Asset::new("a", format!("https://{host}/js/app.js"));
        let include = IncludeList::parse("app.js");
        prop_assert_eq!(
            filter::check(&asset, &settings(include), &site()),
            Some(Ineligibility::CrossOrigin)
        );
    }

    #[test]
    fn unlisted_basenames_are_never_eligible(
        name in "[a-z]{1,10}",
        listed in "[a-z]{1,10}"
    ) {
        prop_assume!(name != listed);
        let asset = Asset::new("a", format!("https://example.com/js/{name}.js"));
        let include = IncludeList::parse(&format!("{listed}.js"));
        prop_assert_eq!(
            filter::check(&asset, &settings(include), &site()),
            Some(Ineligibility::NotIncluded)
        );
    }

    #[test]
    fn locate_is_deterministic_and_mirrors_the_url_path(
        dirs in prop::collection::vec("[a-z]{1,6}", 0..4),
        stem in "[a-z]{1,8}"
    ) {
        let dir_part = if dirs.is_empty() {
            String::new()
        } else {
            format!("{}/", dirs.join("/"))
        };
        let src = format!("https://example.com/{dir_part}{stem}.js");

        let site = site();
        let first = site.locate(&src).unwrap();
        let second = site.locate(&src).unwrap();
        prop_assert_eq!(&first, &second);

        prop_assert_eq!(&first.filename, &format!("{stem}.js"));
        prop_assert_eq!(&first.relative_dir, &dirs.join("/"));
        prop_assert!(!first.relative_dir.starts_with('/'));
        prop_assert_eq!(first.extension.as_deref(), Some("js"));
    }
}
