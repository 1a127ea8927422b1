//! Logging service and sinks

use super::codes::Code;
use super::events::{LogEvent, LogLevel};
use crate::config::runtime::LoggingPreferences;
use std::sync::{Arc, Mutex};

/// Destination for log events
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service: filters by level and fans out to one or more sinks
pub struct LoggingService {
    loggers: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self {
            loggers: vec![logger],
            min_level,
        }
    }

    /// Service that drops every event
    pub fn silent() -> Self {
        Self {
            loggers: Vec::new(),
            min_level: LogLevel::Error,
        }
    }

    /// Add another sink
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.loggers.push(logger);
        self
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            for logger in &self.loggers {
                logger.log(&event);
            }
        }
    }

    pub fn log_error(&self, code: Code, message: &str) {
        self.log_event(LogEvent::error(code, message));
    }

    pub fn log_warning_with_code(&self, code: Code, message: &str) {
        self.log_event(LogEvent::warning_with_code(code, message));
    }

    pub fn log_success(&self, code: Code, message: &str) {
        self.log_event(LogEvent::success(code, message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Build the service described by the logging preferences
pub fn create_configured_service(preferences: &LoggingPreferences) -> LoggingService {
    let min_level = preferences.min_log_level;
    let mut service = LoggingService::silent();
    service.set_min_level(min_level);

    if preferences.forward_to_log_facade {
        service = service.with_logger(Arc::new(FacadeLogger::new("survey_engine")));
    }
    if preferences.enable_console_logging {
        let console: Arc<dyn Logger> = if preferences.use_structured_logging {
            Arc::new(StructuredLogger::new(min_level))
        } else {
            Arc::new(ConsoleLogger::new(min_level))
        };
        service = service.with_logger(console);
    }

    service
}

/// Forwards events to the `log` crate so host applications pick them up
/// through whatever logger implementation they installed
pub struct FacadeLogger {
    target: &'static str,
}

impl FacadeLogger {
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl Logger for FacadeLogger {
    fn log(&self, event: &LogEvent) {
        log::log!(target: self.target, event.level.to_facade_level(), "{}", event.format());
    }
}

/// Plain text console logger
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            match event.level {
                LogLevel::Error => eprintln!("{}", event.format()),
                _ => println!("{}", event.format()),
            }
        }
    }
}

/// JSON-lines console logger
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level > self.min_level {
            return;
        }
        let line = event.format_json().unwrap_or_else(|_| event.format());
        match event.level {
            LogLevel::Error => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }
}

/// In-memory logger for tests and embedding hosts
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    pub fn has_event_with_code(&self, code: Code) -> bool {
        self.get_events().iter().any(|e| e.code == code)
    }

    pub fn get_warnings(&self) -> Vec<LogEvent> {
        self.get_events()
            .into_iter()
            .filter(|e| e.is_warning())
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_min_level_filters_events() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Warning);

        service.log_debug("dropped");
        service.log_info("dropped");
        service.log_warning_with_code(codes::condition::MALFORMED_TERM, "kept");
        service.log_error(codes::system::INTERNAL_ERROR, "kept");

        assert_eq!(memory.event_count(), 2);
        assert!(memory.has_event_with_code(codes::condition::MALFORMED_TERM));
        assert_eq!(memory.get_warnings().len(), 1);
    }

    #[test]
    fn test_fan_out_to_every_sink() {
        let first = Arc::new(MemoryLogger::new());
        let second = Arc::new(MemoryLogger::new());
        let service =
            LoggingService::new(first.clone(), LogLevel::Info).with_logger(second.clone());

        service.log_success(codes::success::SECTION_VALIDATED, "ok");

        assert_eq!(first.event_count(), 1);
        assert_eq!(second.event_count(), 1);
    }

    #[test]
    fn test_silent_service_drops_everything() {
        let service = LoggingService::silent();
        assert!(service.should_log(LogLevel::Error));
        service.log_error(codes::system::INTERNAL_ERROR, "nowhere to go");
    }

    #[test]
    fn test_configured_service_without_sinks() {
        let preferences = LoggingPreferences {
            use_structured_logging: false,
            enable_console_logging: false,
            forward_to_log_facade: false,
            min_log_level: LogLevel::Debug,
        };
        let service = create_configured_service(&preferences);
        assert!(service.should_log(LogLevel::Debug));
        assert!(service.loggers.is_empty());
    }
}
