//! Demo configuration loaded from environment variables.

use std::time::Duration;

use palaver_shared::{CallMedium, ConversationId};
use palaver_store::StoreConfig;

/// Demo session configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Timings and placeholder text for the store.
    pub store: StoreConfig,

    /// Wall-clock interval at which virtual time is advanced.
    /// Env: `PALAVER_DEMO_TICK_MS`
    /// Default: 100 ms
    pub tick: Duration,

    /// Conversation the scripted session talks in.
    /// Env: `PALAVER_DEMO_CHAT`
    /// Default: `chat-user-2`
    pub conversation: ConversationId,

    /// Medium of the scripted call.
    /// Env: `PALAVER_DEMO_CALL` (audio/video)
    /// Default: `audio`
    pub call_medium: CallMedium,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            tick: Duration::from_millis(100),
            conversation: ConversationId::from("chat-user-2"),
            call_medium: CallMedium::Audio,
        }
    }
}

impl DemoConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self {
            store: StoreConfig::from_env(),
            ..Self::default()
        };

        if let Ok(val) = std::env::var("PALAVER_DEMO_TICK_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => config.tick = Duration::from_millis(ms),
                _ => tracing::warn!(value = %val, "Invalid PALAVER_DEMO_TICK_MS, using default"),
            }
        }

        if let Ok(id) = std::env::var("PALAVER_DEMO_CHAT") {
            if !id.trim().is_empty() {
                config.conversation = ConversationId(id.trim().to_string());
            }
        }

        if let Ok(val) = std::env::var("PALAVER_DEMO_CALL") {
            match val.parse::<CallMedium>() {
                Ok(medium) => config.call_medium = medium,
                Err(e) => tracing::warn!(error = %e, "Invalid PALAVER_DEMO_CALL, using default"),
            }
        }

        config
    }
}
