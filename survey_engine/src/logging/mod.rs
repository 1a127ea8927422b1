//! Global logging module for the survey engine
//!
//! Events are code-tagged (see [`codes`]) and routed through a single
//! process-wide [`LoggingService`]. Until [`init_global_logging`] is called the
//! macros are no-ops, so the engine stays silent when embedded in a host that
//! does not care about its diagnostics.

pub mod codes;
pub mod events;
pub mod macros;
pub mod service;

use crate::config::runtime::LoggingPreferences;
use std::sync::{Arc, OnceLock};

// Re-export main types
pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, FacadeLogger, Logger, LoggingService, MemoryLogger, StructuredLogger,
};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the `SURVEY_LOGGING_*` environment
pub fn init_global_logging() -> Result<(), String> {
    init_global_logging_with_preferences(&LoggingPreferences::default())
}

/// Initialize global logging from explicit preferences
pub fn init_global_logging_with_preferences(
    preferences: &LoggingPreferences,
) -> Result<(), String> {
    let service = Arc::new(service::create_configured_service(preferences));
    init_global_logging_with_service(service.clone())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));
    Ok(())
}

/// Initialize with custom service (primarily for testing and embedding)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn emit(mut event: LogEvent, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    logger.log_event(event);
}

/// Log error with context (used by `log_error!`)
pub fn log_error_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    emit(LogEvent::error(code, message), context);
}

/// Log warning with context (used by `log_warning!`)
pub fn log_warning_with_context(code: Option<Code>, message: &str, context: Vec<(&str, &str)>) {
    let event = match code {
        Some(code) => LogEvent::warning_with_code(code, message),
        None => LogEvent::warning(message),
    };
    emit(event, context);
}

/// Log success with context (used by `log_success!`)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    emit(LogEvent::success(code, message), context);
}

/// Log info with context (used by `log_info!`)
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    emit(LogEvent::info(message), context);
}

/// Log debug with context (used by `log_debug!`)
pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    emit(LogEvent::debug(message), context);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_are_safe_before_or_after_init() {
        // Another test may already have installed the global logger.
        let _ = init_global_logging_with_service(Arc::new(LoggingService::silent()));
        crate::log_warning!("warning without code", "key" => 1);
        crate::log_debug!("debug message");
        assert!(is_initialized());
    }

    #[test]
    fn test_double_init_is_rejected() {
        let _ = init_global_logging_with_service(Arc::new(LoggingService::silent()));
        let second = init_global_logging_with_service(Arc::new(LoggingService::silent()));
        assert!(second.is_err());
    }
}
