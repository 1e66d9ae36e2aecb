#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Malformed manifests must surface as errors, never panics
        let _ = eksforge::decode_documents(content, std::path::Path::new("fuzz.yaml"));
    }
});
