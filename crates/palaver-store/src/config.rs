//! Store configuration loaded from environment variables.
//!
//! Every setting has a default matching the demo's original timings, so a
//! store can be built with zero configuration.

use std::time::Duration;

use palaver_shared::constants::{
    DEFAULT_CALL_END_DELAY_MS, DEFAULT_DELIVERY_DELAY_MS, DEFAULT_TYPING_TIMEOUT_MS,
    DELETED_MESSAGE_PLACEHOLDER, ENV_CALL_END_DELAY_MS, ENV_DELETED_PLACEHOLDER,
    ENV_DELIVERY_DELAY_MS, ENV_TYPING_TIMEOUT_MS, MAX_DELAY_MS,
};

/// Conversation store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Time between sending a message and it being marked delivered.
    /// Env: `PALAVER_DELIVERY_DELAY_MS`
    /// Default: 1000 ms
    pub delivery_delay: Duration,

    /// Length of a simulated call.
    /// Env: `PALAVER_CALL_END_DELAY_MS`
    /// Default: 3000 ms
    pub call_end_delay: Duration,

    /// Idle time after the last keystroke before the typing indicator clears.
    /// Env: `PALAVER_TYPING_TIMEOUT_MS`
    /// Default: 2000 ms
    pub typing_timeout: Duration,

    /// Text that replaces a soft-deleted message.
    /// Env: `PALAVER_DELETED_PLACEHOLDER`
    pub deleted_placeholder: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            delivery_delay: Duration::from_millis(DEFAULT_DELIVERY_DELAY_MS),
            call_end_delay: Duration::from_millis(DEFAULT_CALL_END_DELAY_MS),
            typing_timeout: Duration::from_millis(DEFAULT_TYPING_TIMEOUT_MS),
            deleted_placeholder: DELETED_MESSAGE_PLACEHOLDER.to_string(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(delay) = read_millis(&lookup, ENV_DELIVERY_DELAY_MS) {
            config.delivery_delay = delay;
        }

        if let Some(delay) = read_millis(&lookup, ENV_CALL_END_DELAY_MS) {
            config.call_end_delay = delay;
        }

        if let Some(timeout) = read_millis(&lookup, ENV_TYPING_TIMEOUT_MS) {
            config.typing_timeout = timeout;
        }

        if let Some(text) = lookup(ENV_DELETED_PLACEHOLDER) {
            if !text.trim().is_empty() {
                config.deleted_placeholder = text;
            }
        }

        config
    }
}

fn read_millis<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms <= MAX_DELAY_MS => Some(Duration::from_millis(ms)),
        Ok(ms) => {
            tracing::warn!(
                key,
                value = ms,
                max = MAX_DELAY_MS,
                "Duration out of range, using default"
            );
            None
        }
        Err(e) => {
            tracing::warn!(
                key,
                value = %raw,
                error = %e,
                "Invalid duration, using default"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.delivery_delay, Duration::from_secs(1));
        assert_eq!(config.call_end_delay, Duration::from_secs(3));
        assert_eq!(config.deleted_placeholder, "This message was deleted");
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_DELIVERY_DELAY_MS, "250"),
            (ENV_DELETED_PLACEHOLDER, "[removed]"),
        ]
        .into_iter()
        .collect();

        let config = StoreConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.delivery_delay, Duration::from_millis(250));
        assert_eq!(config.call_end_delay, Duration::from_secs(3));
        assert_eq!(config.deleted_placeholder, "[removed]");
    }

    #[test]
    fn test_invalid_value_keeps_default() {
        let config = StoreConfig::from_lookup(|k| {
            (k == ENV_TYPING_TIMEOUT_MS).then(|| "soon".to_string())
        });
        assert_eq!(config.typing_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_out_of_range_value_keeps_default() {
        let config = StoreConfig::from_lookup(|k| {
            (k == ENV_CALL_END_DELAY_MS).then(|| "10000000000000000".to_string())
        });
        assert_eq!(config.call_end_delay, Duration::from_secs(3));

        let config = StoreConfig::from_lookup(|k| {
            (k == ENV_CALL_END_DELAY_MS).then(|| MAX_DELAY_MS.to_string())
        });
        assert_eq!(config.call_end_delay, Duration::from_millis(MAX_DELAY_MS));
    }
}
