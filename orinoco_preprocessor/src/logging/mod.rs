//! Global logging module for the Orinoco preprocessor
//!
//! Provides a thread-safe global logging service, a diagnostic code registry
//! and a macro interface. Logging before initialization is a no-op.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::sync::{Arc, OnceLock};

// Re-export main types
pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging system
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    // Validate error code system
    let test_codes = [
        codes::system::INTERNAL_ERROR,
        codes::configuration::INVALID_SYNTAX,
        codes::expansion::MISSING_ARGUMENT,
    ];
    for code in &test_codes {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Check if global logging is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

type Context<'a> = Vec<(&'a str, String)>;

fn apply_context(event: LogEvent, context: Context<'_>) -> LogEvent {
    context
        .into_iter()
        .fold(event, |event, (key, value)| event.with_context(key, &value))
}

/// Whether a debug event would reach the logger
pub fn debug_enabled() -> bool {
    try_get_global_logger().map_or(false, |logger| logger.should_log(LogLevel::Debug))
}

/// Backing function of `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Context<'_>,
) {
    if let Some(logger) = try_get_global_logger() {
        let mut event = apply_context(LogEvent::error(code, message), context);
        if let Some(span) = span {
            event = event.with_span(span);
        }
        logger.log_event(event);
    }
}

/// Backing function of `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Context<'_>) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(apply_context(LogEvent::success(code, message), context));
    }
}

/// Backing function of `log_info!`, `log_warning!` and `log_debug!`
pub fn log_with_context(level: LogLevel, message: &str, context: Context<'_>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    let event = match level {
        LogLevel::Error | LogLevel::Warning => LogEvent::warning(message),
        LogLevel::Info => LogEvent::info(message),
        LogLevel::Debug => LogEvent::debug(message),
    };
    logger.log_event(apply_context(event, context));
}

/// Get system diagnostics
pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));
    diagnostics.push_str(&format!(
        "Constants: {}\n",
        crate::config::build_info::source_info()
    ));
    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}

/// Install a shared in-memory logger once per test process
#[cfg(test)]
pub(crate) fn install_memory_logger() -> Arc<MemoryLogger> {
    static MEMORY: OnceLock<Arc<MemoryLogger>> = OnceLock::new();
    MEMORY
        .get_or_init(|| {
            let logger = Arc::new(MemoryLogger::new());
            let sink: Arc<dyn Logger> = logger.clone();
            let _ = init_global_logging_with_service(Arc::new(LoggingService::new(sink, LogLevel::Info)));
            logger
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_reach_installed_logger() {
        let logger = install_memory_logger();
        crate::log_error!(codes::system::INTERNAL_ERROR, "installed", "k" => 1);

        assert!(is_initialized());
        assert!(logger.has_error_with_code(codes::system::INTERNAL_ERROR));
        assert!(!debug_enabled());
    }

    #[test]
    fn test_logging_before_init_is_noop() {
        // Must not panic whether or not another test installed a logger
        log_error_with_context(codes::system::INTERNAL_ERROR, "test", None, vec![]);
        crate::log_debug!("debug", "k" => 1);
        crate::log_info!("info", "k" => "v",);
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Initialized:"));
    }
}
