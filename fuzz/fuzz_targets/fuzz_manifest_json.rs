#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Fuzz manifest parsing - malformed manifests must error, not panic
        let _ = scriptpack::AssetRegistry::from_json_str(content, Path::new("fuzz.json"));
    }
});
