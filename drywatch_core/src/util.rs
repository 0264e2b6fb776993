//! Common time helpers for drywatch_core.

/// Number of microseconds in one millisecond.
pub const MICROS_PER_MILLI: u64 = 1_000;
/// Number of seconds in one hour.
pub const SECS_PER_HOUR: u32 = 3_600;
/// Number of seconds in one minute.
pub const SECS_PER_MINUTE: u32 = 60;

/// Format a total-seconds value as `HH:MM:SS`.
pub fn format_hms(total_seconds: u32) -> String {
    let hours = total_seconds / SECS_PER_HOUR;
    let minutes = (total_seconds % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let seconds = total_seconds % SECS_PER_MINUTE;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::format_hms;

    #[test]
    fn pads_and_splits() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(3600 + 30 * 60), "01:30:00");
        assert_eq!(format_hms(48 * 3600 + 59 * 60 + 59), "48:59:59");
    }
}
