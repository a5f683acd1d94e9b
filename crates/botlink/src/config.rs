//! Configuration file and the runtime settings derived from it.
//!
//! The file is JSON with five sections:
//!
//! ```json
//! {
//!   "server":   { "host": "localhost", "port": 25565 },
//!   "account":  { "type": "legacy", "email": "", "username": "Steve", "password": "..." },
//!   "behavior": { "auto_connect_on_startup": true, "auto_reconnect": true,
//!                 "reconnect_delay_seconds": 30, "max_reconnect_attempts": 10,
//!                 "idle_timeout_minutes": 60 },
//!   "advanced": { "keep_alive_interval": 20 },
//!   "logging":  { "debug": false, "log_packets": false }
//! }
//! ```
//!
//! Missing keys take their defaults. [`ClientConfig::load_or_init`] writes
//! the default file on first run; its placeholder credentials are rejected
//! by validation so the client never starts with them.

use std::path::Path;
use std::time::Duration;

use botlink_auth::AccountType;
use botlink_transport::Endpoint;
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::scheduler::ReconnectPolicy;

const PLACEHOLDER_EMAIL: &str = "your-email@example.com";
const PLACEHOLDER_USERNAME: &str = "MinecraftUsername";
const PLACEHOLDER_PASSWORD: &str = "your-password";

/// One week.
const MAX_IDLE_TIMEOUT_MINUTES: u64 = 7 * 24 * 60;

// ---------------------------------------------------------------------------
// File sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 25565,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSection {
    /// `microsoft` or `legacy`.
    #[serde(rename = "type")]
    pub account_type: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl Default for AccountSection {
    fn default() -> Self {
        Self {
            account_type: AccountType::Microsoft.to_string(),
            email: PLACEHOLDER_EMAIL.into(),
            username: PLACEHOLDER_USERNAME.into(),
            password: PLACEHOLDER_PASSWORD.into(),
        }
    }
}

impl std::fmt::Debug for AccountSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSection")
            .field("account_type", &self.account_type)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorSection {
    pub auto_connect_on_startup: bool,
    pub auto_reconnect: bool,
    pub reconnect_delay_seconds: u64,
    pub max_reconnect_attempts: u32,
    /// 0 disables idle warnings.
    pub idle_timeout_minutes: u64,
}

impl Default for BehaviorSection {
    fn default() -> Self {
        Self {
            auto_connect_on_startup: true,
            auto_reconnect: true,
            reconnect_delay_seconds: 30,
            max_reconnect_attempts: 10,
            idle_timeout_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSection {
    /// Seconds between liveness checks.
    pub keep_alive_interval: u64,
}

impl Default for AdvancedSection {
    fn default() -> Self {
        Self {
            keep_alive_interval: 20,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub debug: bool,
    pub log_packets: bool,
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server: ServerSection,
    pub account: AccountSection,
    pub behavior: BehaviorSection,
    pub advanced: AdvancedSection,
    pub logging: LoggingSection,
}

impl ClientConfig {
    /// Reads, parses, and validates the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Like [`load`](Self::load), but first writes the default file when
    /// none exists. A freshly written file fails validation until the
    /// placeholder credentials are replaced.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            Self::default().save(path)?;
            tracing::info!(path = %path.display(), "wrote default configuration");
        }
        Self::load(path)
    }

    /// Parses and validates a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks account details and numeric ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let account_type: AccountType =
            self.account
                .account_type
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    field: "account.type",
                    reason: format!(
                        "{:?} (allowed: microsoft, legacy)",
                        self.account.account_type
                    ),
                })?;

        match account_type {
            AccountType::Microsoft => {
                if self.account.email == PLACEHOLDER_EMAIL {
                    return Err(ConfigError::Placeholder {
                        field: "account.email",
                    });
                }
                if !self.account.email.contains('@') {
                    return Err(ConfigError::Invalid {
                        field: "account.email",
                        reason: format!("{:?} is not an e-mail address", self.account.email),
                    });
                }
            }
            AccountType::Legacy => {
                if self.account.username == PLACEHOLDER_USERNAME {
                    return Err(ConfigError::Placeholder {
                        field: "account.username",
                    });
                }
            }
        }
        if self.account.password == PLACEHOLDER_PASSWORD {
            return Err(ConfigError::Placeholder {
                field: "account.password",
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "server.host",
                reason: "must not be empty".into(),
            });
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                field: "server.port",
                reason: "must not be 0".into(),
            });
        }

        check_range(
            "behavior.reconnect_delay_seconds",
            self.behavior.reconnect_delay_seconds,
            1,
            3600,
        )?;
        check_range(
            "behavior.max_reconnect_attempts",
            u64::from(self.behavior.max_reconnect_attempts),
            1,
            100,
        )?;
        check_range(
            "advanced.keep_alive_interval",
            self.advanced.keep_alive_interval,
            5,
            300,
        )?;
        check_range(
            "behavior.idle_timeout_minutes",
            self.behavior.idle_timeout_minutes,
            0,
            MAX_IDLE_TIMEOUT_MINUTES,
        )?;
        Ok(())
    }

    /// Runtime settings for the connection actor.
    pub fn settings(&self) -> Settings {
        let identifier = match self.account.account_type.parse() {
            Ok(AccountType::Legacy) => self.account.username.clone(),
            _ => self.account.email.clone(),
        };
        let idle_timeout = match self.behavior.idle_timeout_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(minutes.saturating_mul(60))),
        };
        Settings {
            endpoint: Endpoint::new(self.server.host.clone(), self.server.port),
            account: AccountSettings {
                account_type: self.account.account_type.clone(),
                identifier,
                secret: self.account.password.clone(),
            },
            policy: ReconnectPolicy {
                delay: Duration::from_secs(self.behavior.reconnect_delay_seconds),
                max_attempts: self.behavior.max_reconnect_attempts,
                auto_reconnect: self.behavior.auto_reconnect,
            },
            keep_alive_interval: Duration::from_secs(self.advanced.keep_alive_interval),
            idle_timeout,
            log_packets: self.logging.log_packets,
        }
    }
}

fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The subset of configuration the connection actor works from.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: Endpoint,
    pub account: AccountSettings,
    pub policy: ReconnectPolicy,
    pub keep_alive_interval: Duration,
    pub idle_timeout: Option<Duration>,
    pub log_packets: bool,
}

/// Account details handed to the credential store on every connect.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountSettings {
    /// Passed through unparsed; the store rejects unknown types.
    pub account_type: String,
    pub identifier: String,
    pub secret: String,
}

impl std::fmt::Debug for AccountSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSettings")
            .field("account_type", &self.account_type)
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy() -> ClientConfig {
        let mut config = ClientConfig::default();
        config.account.account_type = "legacy".into();
        config.account.username = "Steve".into();
        config.account.password = "hunter2".into();
        config
    }

    // =====================================================================
    // validate()
    // =====================================================================

    #[test]
    fn test_validate_default_config_rejects_placeholders() {
        let err = ClientConfig::default().validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Placeholder {
                field: "account.email"
            }
        ));
    }

    #[test]
    fn test_validate_legacy_with_real_values_passes() {
        assert!(legacy().validate().is_ok());
    }

    #[test]
    fn test_validate_placeholder_password_rejected() {
        let mut config = legacy();
        config.account.password = PLACEHOLDER_PASSWORD.into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Placeholder {
                field: "account.password"
            })
        ));
    }

    #[test]
    fn test_validate_placeholder_username_rejected() {
        let mut config = legacy();
        config.account.username = PLACEHOLDER_USERNAME.into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Placeholder {
                field: "account.username"
            })
        ));
    }

    #[test]
    fn test_validate_microsoft_email_requires_at_sign() {
        let mut config = legacy();
        config.account.account_type = "microsoft".into();
        config.account.email = "steve.example.com".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "account.email",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_unknown_account_type_rejected() {
        let mut config = legacy();
        config.account.account_type = "mojang".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "account.type",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_range_bounds() {
        let mut config = legacy();
        config.behavior.reconnect_delay_seconds = 3600;
        config.behavior.max_reconnect_attempts = 1;
        config.advanced.keep_alive_interval = 5;
        assert!(config.validate().is_ok());

        config.behavior.reconnect_delay_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { value: 0, .. })
        ));

        config.behavior.reconnect_delay_seconds = 1;
        config.behavior.max_reconnect_attempts = 101;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { max: 100, .. })
        ));

        config.behavior.max_reconnect_attempts = 100;
        config.advanced.keep_alive_interval = 301;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "advanced.keep_alive_interval",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_idle_timeout_capped_at_one_week() {
        let mut config = legacy();
        config.behavior.idle_timeout_minutes = 0;
        assert!(config.validate().is_ok());
        config.behavior.idle_timeout_minutes = 10_080;
        assert!(config.validate().is_ok());

        config.behavior.idle_timeout_minutes = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "behavior.idle_timeout_minutes",
                max: 10_080,
                ..
            })
        ));
    }

    #[test]
    fn test_settings_huge_idle_timeout_does_not_overflow() {
        let mut config = legacy();
        config.behavior.idle_timeout_minutes = u64::MAX;
        assert_eq!(config.settings().idle_timeout, Some(Duration::from_secs(u64::MAX)));
    }

    #[test]
    fn test_validate_zero_port_rejected() {
        let mut config = legacy();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "server.port",
                ..
            })
        ));
    }

    // =====================================================================
    // Parsing
    // =====================================================================

    #[test]
    fn test_from_json_missing_sections_take_defaults() {
        let config = ClientConfig::from_json(
            r#"{ "account": { "type": "legacy", "username": "Alex", "password": "pw" } }"#,
        )
        .unwrap();
        assert_eq!(config.server, ServerSection::default());
        assert_eq!(config.behavior.max_reconnect_attempts, 10);
        assert_eq!(config.advanced.keep_alive_interval, 20);
    }

    #[test]
    fn test_from_json_malformed_is_parse_error() {
        assert!(matches!(
            ClientConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("botlink-test-does-not-exist.json");
        assert!(matches!(
            ClientConfig::load(&path),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_or_init_writes_default_file_then_rejects_it() {
        let path = std::env::temp_dir().join(format!(
            "botlink-init-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let result = ClientConfig::load_or_init(&path);

        assert!(path.exists());
        assert!(matches!(result, Err(ConfigError::Placeholder { .. })));
        let _ = std::fs::remove_file(&path);
    }

    // =====================================================================
    // settings()
    // =====================================================================

    #[test]
    fn test_settings_legacy_uses_username_as_identifier() {
        let settings = legacy().settings();
        assert_eq!(settings.account.identifier, "Steve");
        assert_eq!(settings.endpoint.to_string(), "localhost:25565");
        assert_eq!(settings.policy.delay, Duration::from_secs(30));
        assert_eq!(settings.idle_timeout, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_settings_zero_idle_timeout_disables_idle_check() {
        let mut config = legacy();
        config.behavior.idle_timeout_minutes = 0;
        assert_eq!(config.settings().idle_timeout, None);
    }

    #[test]
    fn test_debug_output_redacts_password() {
        let debug = format!("{:?} {:?}", legacy().account, legacy().settings().account);
        assert!(!debug.contains("hunter2"));
    }
}
