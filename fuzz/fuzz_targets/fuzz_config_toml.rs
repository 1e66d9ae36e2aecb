#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(config) = toml::from_str::<eksforge::Config>(content) {
            let _ = eksforge::domain::cluster::KubernetesVersion::parse(
                &config.cluster.kubernetes_version,
            );
        }
    }
});
