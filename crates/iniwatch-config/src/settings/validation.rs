//! Range checks for watch settings.

use super::schema::WatchSettings;
use iniwatch_common::ConfigError;

const MAX_INTERVAL_MS: u64 = 60_000;
const MAX_CHANNEL_CAPACITY: usize = 4096;

/// Run all checks, collecting every problem into one error.
pub fn validate(settings: &WatchSettings) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_range(
        &mut errors,
        "watch.tick_interval_ms",
        settings.tick_interval_ms,
        1,
        MAX_INTERVAL_MS,
    );
    validate_range(
        &mut errors,
        "watch.reconnect_backoff_ms",
        settings.reconnect_backoff_ms,
        1,
        MAX_INTERVAL_MS,
    );
    validate_range(
        &mut errors,
        "watch.channel_capacity",
        settings.channel_capacity as u64,
        1,
        MAX_CHANNEL_CAPACITY as u64,
    );

    if settings.key_separator.is_empty() {
        errors.push("watch.key_separator must not be empty".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
