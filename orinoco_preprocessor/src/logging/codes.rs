//! Consolidated diagnostic codes and classification system
//!
//! Single source of truth for all codes, their metadata, and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
}

/// Configuration text error codes
pub mod configuration {
    use super::Code;

    pub const INVALID_SYNTAX: Code = Code::new("E100");
    pub const EMPTY_KEY: Code = Code::new("E101");
    pub const NEWLINE_IN_KEY: Code = Code::new("E102");
    pub const INVALID_VALUE: Code = Code::new("E103");
    pub const UNKNOWN_KEY: Code = Code::new("E104");
    pub const LIMIT_EXCEEDED: Code = Code::new("E105");
    pub const IO_ERROR: Code = Code::new("E106");
}

/// Macro expansion error codes
pub mod expansion {
    use super::Code;

    pub const MISSING_ARGUMENT: Code = Code::new("E200");
    pub const NO_ARGUMENTS_GIVEN: Code = Code::new("E201");
    pub const WRONG_ARGUMENT_COUNT: Code = Code::new("E202");
    pub const EXPANSION_TOO_DEEP: Code = Code::new("E203");
    pub const MALFORMED_MACRO: Code = Code::new("E204");
    pub const OUTPUT_TOO_LARGE: Code = Code::new("E205");
    pub const PROBLEM_REPORTED: Code = Code::new("E210");
}

/// Token hand-off queue codes
pub mod queue {
    use super::Code;

    pub const LOCK_POISONED: Code = Code::new("E300");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const CONFIGURATION_LOADED: Code = Code::new("I100");
    pub const MACRO_DEFINED: Code = Code::new("I200");
    pub const MACRO_UNDEFINED: Code = Code::new("I201");
    pub const EXPANSION_COMPLETE: Code = Code::new("I202");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System errors
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal error",
                "File a bug report with the failing input",
            ),
            // Configuration errors
            ErrorMetadata::new(
                "E100",
                "Configuration",
                Severity::Medium,
                true,
                false,
                "Configuration text is malformed",
                "Fix the offending key=value line",
            ),
            ErrorMetadata::new(
                "E101",
                "Configuration",
                Severity::Medium,
                true,
                false,
                "Configuration record has an empty key",
                "Supply a key before '='",
            ),
            ErrorMetadata::new(
                "E102",
                "Configuration",
                Severity::Medium,
                true,
                false,
                "Line ended before '=' was found",
                "Add '=' after the key or load leniently",
            ),
            ErrorMetadata::new(
                "E103",
                "Configuration",
                Severity::Medium,
                true,
                false,
                "Property value cannot be parsed for its type",
                "Use 0/1/true/false for booleans and base-10 integers for numbers",
            ),
            ErrorMetadata::new(
                "E104",
                "Configuration",
                Severity::Low,
                true,
                false,
                "Key is not recognized by the configuration policy",
                "Remove the key or check its spelling",
            ),
            ErrorMetadata::new(
                "E105",
                "Configuration",
                Severity::High,
                false,
                true,
                "Configuration exceeds a compile-time limit",
                "Shorten the line or reduce the number of keys",
            ),
            ErrorMetadata::new(
                "E106",
                "Configuration",
                Severity::Medium,
                false,
                true,
                "Configuration file could not be read",
                "Check the file path and permissions",
            ),
            // Expansion errors
            ErrorMetadata::new(
                "E200",
                "Expansion",
                Severity::Medium,
                true,
                false,
                "Macro parameter has no supplied value",
                "Pass a value for every declared parameter",
            ),
            ErrorMetadata::new(
                "E201",
                "Expansion",
                Severity::Medium,
                true,
                false,
                "Parameterized macro invoked without arguments",
                "Call the macro with a parenthesized argument list",
            ),
            ErrorMetadata::new(
                "E202",
                "Expansion",
                Severity::Medium,
                true,
                false,
                "Argument count does not match macro arity",
                "Match the number of arguments to the macro definition",
            ),
            ErrorMetadata::new(
                "E203",
                "Expansion",
                Severity::High,
                false,
                true,
                "Macro expansion nested beyond the configured depth",
                "Break the macro chain or raise max_expansion_depth",
            ),
            ErrorMetadata::new(
                "E204",
                "Expansion",
                Severity::Medium,
                true,
                false,
                "Macro definition text is malformed",
                "Fix the #define line",
            ),
            ErrorMetadata::new(
                "E205",
                "Expansion",
                Severity::High,
                false,
                true,
                "Expansion output exceeds the configured maximum length",
                "Reduce macro fan-out or raise max_output_length",
            ),
            ErrorMetadata::new(
                "E210",
                "Expansion",
                Severity::Medium,
                true,
                false,
                "Diagnostic reported by a collaborating stage",
                "See the attached message",
            ),
            // Queue errors
            ErrorMetadata::new(
                "E300",
                "Queue",
                Severity::High,
                true,
                false,
                "Token queue lock was poisoned by a panicking producer",
                "Inspect the producer thread that panicked",
            ),
            // Success codes
            ErrorMetadata::new(
                "I004",
                "System",
                Severity::Low,
                true,
                false,
                "Logging system initialized",
                "Continue",
            ),
            ErrorMetadata::new(
                "I100",
                "Configuration",
                Severity::Low,
                true,
                false,
                "Configuration text loaded",
                "Continue",
            ),
            ErrorMetadata::new(
                "I200",
                "Expansion",
                Severity::Low,
                true,
                false,
                "Macro defined",
                "Continue",
            ),
            ErrorMetadata::new(
                "I201",
                "Expansion",
                Severity::Low,
                true,
                false,
                "Macro undefined",
                "Continue",
            ),
            ErrorMetadata::new(
                "I202",
                "Expansion",
                Severity::Low,
                true,
                false,
                "Macro expansion completed",
                "Continue",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_declared_code_has_metadata() {
        let declared = [
            system::INTERNAL_ERROR,
            configuration::INVALID_SYNTAX,
            configuration::EMPTY_KEY,
            configuration::NEWLINE_IN_KEY,
            configuration::INVALID_VALUE,
            configuration::UNKNOWN_KEY,
            configuration::LIMIT_EXCEEDED,
            configuration::IO_ERROR,
            expansion::MISSING_ARGUMENT,
            expansion::NO_ARGUMENTS_GIVEN,
            expansion::WRONG_ARGUMENT_COUNT,
            expansion::EXPANSION_TOO_DEEP,
            expansion::MALFORMED_MACRO,
            expansion::OUTPUT_TOO_LARGE,
            expansion::PROBLEM_REPORTED,
            queue::LOCK_POISONED,
            success::SYSTEM_INITIALIZATION_COMPLETED,
            success::CONFIGURATION_LOADED,
            success::MACRO_DEFINED,
            success::MACRO_UNDEFINED,
            success::EXPANSION_COMPLETE,
        ];

        for code in declared {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification_lookups() {
        assert_eq!(get_category("E202"), "Expansion");
        assert_eq!(get_severity("E203"), Severity::High);
        assert!(requires_halt("E203"));
        assert!(is_recoverable("E100"));
        assert_eq!(get_description("nope"), "Unknown error");
    }
}
