/// Application name
pub const APP_NAME: &str = "Palaver";

/// Delay before a freshly sent message is marked delivered (milliseconds)
pub const DEFAULT_DELIVERY_DELAY_MS: u64 = 1_000;

/// Delay before a placed call is considered ended (milliseconds)
pub const DEFAULT_CALL_END_DELAY_MS: u64 = 3_000;

/// Idle time after the last keystroke before the typing indicator clears (milliseconds)
pub const DEFAULT_TYPING_TIMEOUT_MS: u64 = 2_000;

/// Upper bound accepted for any configured delay (milliseconds)
pub const MAX_DELAY_MS: u64 = 86_400_000;

/// Text shown in place of a soft-deleted message
pub const DELETED_MESSAGE_PLACEHOLDER: &str = "This message was deleted";

/// Environment variable names read by `StoreConfig::from_env`
pub const ENV_DELIVERY_DELAY_MS: &str = "PALAVER_DELIVERY_DELAY_MS";
pub const ENV_CALL_END_DELAY_MS: &str = "PALAVER_CALL_END_DELAY_MS";
pub const ENV_TYPING_TIMEOUT_MS: &str = "PALAVER_TYPING_TIMEOUT_MS";
pub const ENV_DELETED_PLACEHOLDER: &str = "PALAVER_DELETED_PLACEHOLDER";
