//! Configuration module for the survey engine
//!
//! Compile-time limits live in [`constants`]; user preferences and photo rules
//! are read at runtime from `SURVEY_*` environment variables and an optional
//! TOML file (see [`runtime`]).

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{ConfigError, ConfigResult, LoggingPreferences, RuntimeConfig, ValidationPreferences};
