//! Human-readable error descriptions for common failure modes.

/// Map an eyre::Report to an explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use drywatch_core::error::BuildError;

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("parse config") {
        return "What happened: The config file is not valid TOML for this schema.\nLikely causes: A typo, a misplaced section, or a value of the wrong type.\nHow to fix: Compare against the sample config; every section and key is optional.".to_string();
    }

    if lower.contains("gpio") {
        return "What happened: Failed to attach to the bus GPIO pins.\nLikely causes: Incorrect pin numbers in [pins], or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO.".to_string();
    }

    if lower.contains("no gpio support") {
        return "What happened: This binary was built without GPIO support.\nLikely causes: The default build only includes the simulator.\nHow to fix: Rebuild with `--features hardware` on a Raspberry Pi, or use the `simulate` command.".to_string();
    }

    format!(
        "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
    )
}
