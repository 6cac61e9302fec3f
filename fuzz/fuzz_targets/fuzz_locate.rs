#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(src) = std::str::from_utf8(data) {
        let site = scriptpack::Site::new(
            "https://example.com",
            "/srv/site",
            "/srv/site/uploads",
            "https://example.com/uploads",
        )
        .unwrap();

        // Arbitrary srcs must never panic the origin check or the mapping
        let _ = site.same_origin(src);
        if let Some(location) = site.locate(src) {
            assert!(!location.filename.is_empty());
        }
    }
});
