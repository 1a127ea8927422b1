// RUNTIME PREFERENCES (operator and deployment choices)

use crate::config::constants::compile_time::validation::DEFAULT_COMMENT_QUESTION_ID;
use crate::logging::events::LogLevel;
use crate::logging::{codes, Code};
use crate::validation::photo_rules::{PhotoRule, PhotoRuleSet};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::Io { .. } => codes::config::CONFIG_IO_ERROR,
            Self::Parse(_) => codes::config::CONFIG_PARSE_ERROR,
            Self::Invalid { .. } => codes::config::CONFIG_INVALID,
        }
    }
}

/// Read an environment variable and parse it, falling back to `default`
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPreferences {
    /// Question id reserved for the photo-count justification
    pub comment_question_id: u32,

    /// Whether whitespace-only text counts as an unanswered mandatory field
    pub blank_text_is_missing: bool,

    /// Whether every visibility decision is logged at debug level
    pub log_visibility_decisions: bool,
}

impl Default for ValidationPreferences {
    fn default() -> Self {
        Self {
            comment_question_id: env_or(env_vars::COMMENT_QUESTION_ID, DEFAULT_COMMENT_QUESTION_ID),
            blank_text_is_missing: env_or(env_vars::BLANK_TEXT_IS_MISSING, true),
            log_visibility_decisions: env_or(env_vars::LOG_VISIBILITY_DECISIONS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to write events to stdout/stderr
    pub enable_console_logging: bool,

    /// Whether to forward events to the `log` facade
    pub forward_to_log_facade: bool,

    /// Minimum level that reaches any sink
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            forward_to_log_facade: env_or(env_vars::LOGGING_FORWARD_TO_FACADE, true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.trim().to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Complete runtime configuration, usually loaded from `survey.toml`
///
/// ```toml
/// [validation]
/// comment_question_id = 100
///
/// [logging]
/// min_log_level = "warning"
///
/// [[photo_rules]]
/// section = "Installation des bornes"
/// fields = ["Nb bornes standard", "Nb bornes pré-équipées"]
/// multiplier = 1.0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub validation: ValidationPreferences,
    pub logging: LoggingPreferences,
    pub photo_rules: Vec<PhotoRule>,
}

impl RuntimeConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: RuntimeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;

        crate::log_success!(
            codes::success::CONFIG_LOADED,
            "Runtime configuration loaded",
            "path" => path.display(),
            "photo_rules" => config.photo_rules.len()
        );

        Ok(config)
    }

    /// Load from `SURVEY_CONFIG_PATH` when set, otherwise use defaults
    pub fn from_env() -> ConfigResult<Self> {
        match env::var(env_vars::CONFIG_PATH) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> ConfigResult<()> {
        if self.validation.comment_question_id == 0 {
            return Err(ConfigError::invalid(
                "validation.comment_question_id must be a positive question id",
            ));
        }
        self.photo_rule_set().map(|_| ())
    }

    /// Build the validated photo rule set
    pub fn photo_rule_set(&self) -> ConfigResult<PhotoRuleSet> {
        PhotoRuleSet::from_rules(self.photo_rules.clone())
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    pub const CONFIG_PATH: &str = "SURVEY_CONFIG_PATH";

    // Validation
    pub const COMMENT_QUESTION_ID: &str = "SURVEY_COMMENT_QUESTION_ID";
    pub const BLANK_TEXT_IS_MISSING: &str = "SURVEY_BLANK_TEXT_IS_MISSING";
    pub const LOG_VISIBILITY_DECISIONS: &str = "SURVEY_LOG_VISIBILITY_DECISIONS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SURVEY_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SURVEY_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_FORWARD_TO_FACADE: &str = "SURVEY_LOGGING_FORWARD_TO_FACADE";
    pub const LOGGING_MIN_LEVEL: &str = "SURVEY_LOGGING_MIN_LEVEL";
}
