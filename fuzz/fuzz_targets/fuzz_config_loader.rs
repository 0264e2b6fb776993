#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // TOML parsing and validation of Config must reject bad input with an
    // error, never a panic.
    match toml::from_str::<drywatch_config::Config>(data) {
        Ok(cfg) => {
            let _ = cfg.validate();
        }
        Err(_e) => {
            // parse error is acceptable
        }
    }
});
