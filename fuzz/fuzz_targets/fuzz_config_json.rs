#![no_main]

use libfuzzer_sys::fuzz_target;
use rewind_engine::EngineConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Any config that loads must be usable.
    if let Ok(config) = EngineConfig::from_json_str(text) {
        assert!(config.validate().is_empty());
        assert!(config.max_history_size > 0);
    }
});
