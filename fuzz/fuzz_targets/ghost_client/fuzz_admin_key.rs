// Run with: cargo fuzz run fuzz_admin_key
#![no_main]

use ghostcron::ghost_client::AdminApiKey;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(key) = AdminApiKey::parse(data) {
        assert!(!key.id().is_empty());
        // Debug output must never leak the secret half.
        if let Some((_, secret)) = data.trim().split_once(':') {
            if secret.len() >= 8 {
                assert!(!format!("{key:?}").contains(secret));
            }
        }
    }
});
