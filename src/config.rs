//! Add-on configuration loaded from environment variables.

use std::path::PathBuf;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_PLUGIN_KEY: &str = "gi-standup";
const DEFAULT_ADDON_NAME: &str = "GI Standup";
const DEFAULT_FROM_NAME: &str = "Standup";
/// Local hour at which the reminder job pings room members.
const DEFAULT_REMINDER_HOUR: u32 = 21;

#[derive(Clone, Debug)]
pub struct AddonConfig {
    /// Public URL HipChat uses to reach this add-on (from STANDUP_BASE_URL)
    pub base_url: String,
    /// Unique add-on key (from STANDUP_PLUGIN_KEY)
    pub plugin_key: String,
    /// Display name of the add-on (from STANDUP_ADDON_NAME)
    pub addon_name: String,
    /// Sender label on notifications (from STANDUP_FROM_NAME)
    pub from_name: String,
    /// Local hour for the reminder job, 0-23 (from STANDUP_REMINDER_HOUR)
    pub reminder_hour: u32,
    /// Database file (from STANDUP_DB_PATH); the platform data dir when unset
    pub db_path: Option<PathBuf>,
}

impl AddonConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("STANDUP_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let reminder_hour = std::env::var("STANDUP_REMINDER_HOUR")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|hour| *hour < 24)
            .unwrap_or(DEFAULT_REMINDER_HOUR);

        Self {
            base_url,
            plugin_key: env_or("STANDUP_PLUGIN_KEY", DEFAULT_PLUGIN_KEY),
            addon_name: env_or("STANDUP_ADDON_NAME", DEFAULT_ADDON_NAME),
            from_name: env_or("STANDUP_FROM_NAME", DEFAULT_FROM_NAME),
            reminder_hour,
            db_path: std::env::var("STANDUP_DB_PATH").ok().map(PathBuf::from),
        }
    }

    /// Defaults with the given public URL (for testing).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            plugin_key: DEFAULT_PLUGIN_KEY.to_string(),
            addon_name: DEFAULT_ADDON_NAME.to_string(),
            from_name: DEFAULT_FROM_NAME.to_string(),
            reminder_hour: DEFAULT_REMINDER_HOUR,
            db_path: None,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
