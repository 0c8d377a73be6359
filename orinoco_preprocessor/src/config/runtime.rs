// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionPreferences {
    /// Whether to log every macro definition and removal
    pub log_definitions: bool,

    /// Whether to log a success event for each completed expansion
    pub log_expansions: bool,

    /// Whether expansion errors are reported and replaced by empty text
    /// instead of aborting the expansion
    pub report_and_continue: bool,
}

impl Default for ExpansionPreferences {
    fn default() -> Self {
        Self {
            log_definitions: env::var(env_vars::EXPANSION_LOG_DEFINITIONS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_expansions: env::var(env_vars::EXPANSION_LOG_EXPANSIONS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            report_and_continue: env::var(env_vars::EXPANSION_REPORT_AND_CONTINUE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyPreferences {
    /// Reject configuration text that is missing its final newline
    pub strict_loading: bool,

    /// Whether to log each applied `key=value` record
    pub log_records: bool,
}

impl Default for PropertyPreferences {
    fn default() -> Self {
        Self {
            strict_loading: env::var(env_vars::PROPERTIES_STRICT_LOADING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_records: env::var(env_vars::PROPERTIES_LOG_RECORDS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub expansion: ExpansionPreferences,
    pub properties: PropertyPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Built-in values, ignoring the environment
    pub fn default_values() -> Self {
        Self {
            expansion: ExpansionPreferences {
                log_definitions: false,
                log_expansions: false,
                report_and_continue: false,
            },
            properties: PropertyPreferences {
                strict_loading: false,
                log_records: false,
            },
            logging: LoggingPreferences {
                use_structured_logging: false,
                enable_console_logging: false,
                min_log_level: LogLevel::Info,
            },
        }
    }

    /// Parse preferences from a TOML document; missing tables fall back to
    /// the environment-derived defaults
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        #[derive(Deserialize)]
        struct Partial {
            expansion: Option<ExpansionPreferences>,
            properties: Option<PropertyPreferences>,
            logging: Option<LoggingPreferences>,
        }

        let partial: Partial = toml::from_str(text)?;
        Ok(Self {
            expansion: partial.expansion.unwrap_or_default(),
            properties: partial.properties.unwrap_or_default(),
            logging: partial.logging.unwrap_or_default(),
        })
    }

    /// Render the preferences as a TOML document
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Expansion
    pub const EXPANSION_LOG_DEFINITIONS: &str = "ORINOCO_EXPANSION_LOG_DEFINITIONS";
    pub const EXPANSION_LOG_EXPANSIONS: &str = "ORINOCO_EXPANSION_LOG_EXPANSIONS";
    pub const EXPANSION_REPORT_AND_CONTINUE: &str = "ORINOCO_EXPANSION_REPORT_AND_CONTINUE";

    // Properties
    pub const PROPERTIES_STRICT_LOADING: &str = "ORINOCO_PROPERTIES_STRICT_LOADING";
    pub const PROPERTIES_LOG_RECORDS: &str = "ORINOCO_PROPERTIES_LOG_RECORDS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "ORINOCO_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "ORINOCO_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "ORINOCO_LOGGING_MIN_LEVEL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = RuntimeConfig::default();
        config.expansion.report_and_continue = true;
        config.logging.min_log_level = LogLevel::Debug;

        let text = config.to_toml_string().unwrap();
        let parsed = RuntimeConfig::from_toml_str(&text).unwrap();

        assert!(parsed.expansion.report_and_continue);
        assert_eq!(parsed.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_default_values_are_quiet() {
        let config = RuntimeConfig::default_values();
        assert!(!config.expansion.report_and_continue);
        assert!(!config.properties.strict_loading);
        assert_eq!(config.logging.min_log_level, LogLevel::Info);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = RuntimeConfig::from_toml_str(
            "[properties]\nstrict_loading = true\nlog_records = false\n",
        )
        .unwrap();
        assert!(parsed.properties.strict_loading);
    }
}
