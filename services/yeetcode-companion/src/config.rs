//! Companion Configuration
//!
//! Loaded from an optional file, `config/default`, `config/local` and
//! `YEETCODE__*` environment variables, in increasing priority.

use serde::{Deserialize, Serialize};

use yeetcode_leaderboard::CadenceConfig;
use yeetcode_types::Username;
use yeetcode_watcher::{BackoffPolicy, WatcherConfig};

/// Companion configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanionConfig {
    /// Local member and study group
    #[serde(default)]
    pub user: UserSettings,

    /// Submission polling
    #[serde(default)]
    pub polling: PollingSettings,

    /// Leaderboard refresh cadence
    #[serde(default)]
    pub refresh: RefreshSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local member settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    /// Problem-site handle of the local member
    #[serde(default = "default_username")]
    pub username: String,

    /// Invite code of the study group
    #[serde(default = "default_group_code")]
    pub group_code: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            username: default_username(),
            group_code: default_group_code(),
        }
    }
}

/// Submission polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSettings {
    /// First retry interval in milliseconds
    #[serde(default = "default_base_ms")]
    pub base_ms: u64,

    /// Retry interval ceiling in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,

    /// Submissions fetched per poll
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Misses between interval doublings
    #[serde(default = "default_step")]
    pub step: u32,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            base_ms: default_base_ms(),
            max_ms: default_max_ms(),
            batch_size: default_batch_size(),
            step: default_step(),
        }
    }
}

/// Leaderboard refresh settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSettings {
    #[serde(default = "default_foreground_secs")]
    pub foreground_secs: u64,

    #[serde(default = "default_background_secs")]
    pub background_secs: u64,

    /// Minimum gap before a focus-regain refresh
    #[serde(default = "default_min_gap_secs")]
    pub min_gap_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            foreground_secs: default_foreground_secs(),
            background_secs: default_background_secs(),
            min_gap_secs: default_min_gap_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_username() -> String {
    "testuser123".to_string()
}

fn default_group_code() -> String {
    "TEST123".to_string()
}

fn default_base_ms() -> u64 {
    yeetcode_watcher::backoff::DEFAULT_BASE_MS
}

fn default_max_ms() -> u64 {
    yeetcode_watcher::backoff::DEFAULT_MAX_MS
}

fn default_batch_size() -> usize {
    yeetcode_watcher::DEFAULT_BATCH_SIZE
}

fn default_step() -> u32 {
    yeetcode_watcher::backoff::DEFAULT_STEP
}

fn default_foreground_secs() -> u64 {
    yeetcode_leaderboard::cadence::FOREGROUND_INTERVAL_SECS
}

fn default_background_secs() -> u64 {
    yeetcode_leaderboard::cadence::BACKGROUND_INTERVAL_SECS
}

fn default_min_gap_secs() -> u64 {
    yeetcode_leaderboard::cadence::MIN_REFRESH_GAP_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl CompanionConfig {
    /// Load configuration from environment and optional config file
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        // YEETCODE__POLLING__MAX_MS=60000 and friends
        builder = builder.add_source(
            config::Environment::with_prefix("YEETCODE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let companion_config: CompanionConfig = builder.build()?.try_deserialize()?;
        Ok(companion_config)
    }

    /// Configuration for development: debug logging, defaults elsewhere
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            ..Self::default()
        }
    }

    /// Reject settings the runtime cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        self.username()?;

        if self.user.group_code.trim().is_empty() {
            anyhow::bail!("user.group_code must not be empty");
        }
        if self.polling.base_ms == 0 || self.polling.step == 0 || self.polling.batch_size == 0 {
            anyhow::bail!("polling.base_ms, polling.step and polling.batch_size must be positive");
        }
        if self.polling.max_ms < self.polling.base_ms {
            anyhow::bail!(
                "polling.max_ms ({}) must not be below polling.base_ms ({})",
                self.polling.max_ms,
                self.polling.base_ms
            );
        }
        if self.refresh.foreground_secs == 0 || self.refresh.background_secs == 0 {
            anyhow::bail!("refresh intervals must be positive");
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            anyhow::bail!("logging.format must be `json` or `pretty`, got `{}`", self.logging.format);
        }

        Ok(())
    }

    /// The local member's normalized username
    pub fn username(&self) -> anyhow::Result<Username> {
        Ok(Username::new(&self.user.username)?)
    }

    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            backoff: BackoffPolicy::new(self.polling.base_ms, self.polling.max_ms, self.polling.step),
            batch_size: self.polling.batch_size,
        }
    }

    pub fn cadence_config(&self) -> CadenceConfig {
        CadenceConfig {
            foreground_secs: self.refresh.foreground_secs,
            background_secs: self.refresh.background_secs,
            min_gap_secs: self.refresh.min_gap_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_runtime_constants() {
        let config = CompanionConfig::default();
        config.validate().unwrap();

        assert_eq!(config.watcher_config(), WatcherConfig::default());
        assert_eq!(config.cadence_config(), CadenceConfig::default());
        assert_eq!(config.username().unwrap().as_str(), "testuser123");
    }

    #[test]
    fn test_validate_rejects_bad_polling() {
        let mut config = CompanionConfig::default();
        config.polling.max_ms = 500;
        assert!(config.validate().is_err());

        let mut config = CompanionConfig::default();
        config.polling.base_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_user() {
        let mut config = CompanionConfig::development();
        config.user.username = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: CompanionConfig =
            serde_json::from_str(r#"{"polling": {"max_ms": 60000}, "user": {"username": "Alice"}}"#)
                .unwrap();

        assert_eq!(config.polling.max_ms, 60_000);
        assert_eq!(config.polling.base_ms, 1_000);
        assert_eq!(config.user.group_code, "TEST123");
        assert_eq!(config.username().unwrap().as_str(), "alice");
    }
}
