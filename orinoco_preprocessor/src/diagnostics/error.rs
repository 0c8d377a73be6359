//! Error taxonomy for the preprocessor core with global logging integration

use crate::logging::{codes, Code};
use crate::segment::Segment;
use crate::utils::Position;
use std::fmt;

pub type PreprocessResult<T> = Result<T, PreprocessError>;

/// Preprocessing errors with diagnostic code mapping and optional segment context
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreprocessError {
    #[error("Missing argument #{index} ('{name}'){}", in_segment(.context))]
    MissingArgument {
        index: usize,
        name: String,
        context: Option<Box<Segment>>,
    },

    #[error("Macro '{macro_name}' expects {expected} argument(s) but none were given{}", in_segment(.context))]
    NoArgumentsGiven {
        macro_name: String,
        expected: usize,
        context: Option<Box<Segment>>,
    },

    #[error("Macro '{macro_name}' expects {expected} argument(s), got {actual}{}", in_segment(.context))]
    WrongArgumentCount {
        macro_name: String,
        expected: usize,
        actual: usize,
        context: Option<Box<Segment>>,
    },

    #[error("Invalid syntax: {message}{}{}", at_position(.position), in_segment(.context))]
    InvalidSyntax {
        message: String,
        position: Option<Position>,
        code: Code,
        context: Option<Box<Segment>>,
    },

    #[error("{message}{}", in_segment(.context))]
    ProblemReported {
        message: String,
        context: Option<Box<Segment>>,
    },

    #[error("Expansion of '{macro_name}' exceeds maximum nesting depth {depth}{}", in_segment(.context))]
    ExpansionTooDeep {
        macro_name: String,
        depth: usize,
        context: Option<Box<Segment>>,
    },

    #[error("Expanded output of {length} characters exceeds limit {limit}{}", in_segment(.context))]
    OutputTooLarge {
        length: usize,
        limit: usize,
        context: Option<Box<Segment>>,
    },
}

fn in_segment(context: &Option<Box<Segment>>) -> String {
    match context {
        Some(segment) => format!(" in `{}`", segment),
        None => String::new(),
    }
}

fn at_position(position: &Option<Position>) -> String {
    match position {
        Some(pos) => format!(" at {}", pos),
        None => String::new(),
    }
}

impl PreprocessError {
    /// Create missing argument error
    pub fn missing_argument(index: usize, name: &str) -> Self {
        Self::MissingArgument {
            index,
            name: name.to_string(),
            context: None,
        }
    }

    /// Create no arguments given error
    pub fn no_arguments_given(macro_name: &str, expected: usize) -> Self {
        Self::NoArgumentsGiven {
            macro_name: macro_name.to_string(),
            expected,
            context: None,
        }
    }

    /// Create wrong argument count error
    pub fn wrong_argument_count(macro_name: &str, expected: usize, actual: usize) -> Self {
        Self::WrongArgumentCount {
            macro_name: macro_name.to_string(),
            expected,
            actual,
            context: None,
        }
    }

    /// Create generic invalid syntax error
    pub fn invalid_syntax(message: &str) -> Self {
        Self::invalid_syntax_with_code(codes::configuration::INVALID_SYNTAX, message, None)
    }

    /// Create invalid syntax error at a position in configuration text
    pub fn invalid_syntax_at(code: Code, message: &str, position: Position) -> Self {
        Self::invalid_syntax_with_code(code, message, Some(position))
    }

    /// Create invalid syntax error with a specific diagnostic code
    pub fn invalid_syntax_with_code(code: Code, message: &str, position: Option<Position>) -> Self {
        Self::InvalidSyntax {
            message: message.to_string(),
            position,
            code,
            context: None,
        }
    }

    /// Create malformed macro definition error
    pub fn malformed_macro(message: &str) -> Self {
        Self::invalid_syntax_with_code(codes::expansion::MALFORMED_MACRO, message, None)
    }

    /// Wrap an externally reported problem; `detail` is rendered into the message
    pub fn problem_reported(message: &str, detail: Option<&dyn fmt::Display>) -> Self {
        let message = match detail {
            Some(detail) => format!("{}: {}", message, detail),
            None => message.to_string(),
        };
        Self::ProblemReported {
            message,
            context: None,
        }
    }

    /// Create expansion depth error
    pub fn expansion_too_deep(macro_name: &str, depth: usize) -> Self {
        Self::ExpansionTooDeep {
            macro_name: macro_name.to_string(),
            depth,
            context: None,
        }
    }

    /// Create output size error
    pub fn output_too_large(length: usize, limit: usize) -> Self {
        Self::OutputTooLarge {
            length,
            limit,
            context: None,
        }
    }

    /// Attach the segment in whose expansion this error occurred
    pub fn with_context(mut self, segment: &Segment) -> Self {
        let slot = match &mut self {
            Self::MissingArgument { context, .. }
            | Self::NoArgumentsGiven { context, .. }
            | Self::WrongArgumentCount { context, .. }
            | Self::InvalidSyntax { context, .. }
            | Self::ProblemReported { context, .. }
            | Self::ExpansionTooDeep { context, .. }
            | Self::OutputTooLarge { context, .. } => context,
        };
        *slot = Some(Box::new(segment.clone()));
        self
    }

    /// Get the advisory segment context, if any
    pub fn context_segment(&self) -> Option<&Segment> {
        match self {
            Self::MissingArgument { context, .. }
            | Self::NoArgumentsGiven { context, .. }
            | Self::WrongArgumentCount { context, .. }
            | Self::InvalidSyntax { context, .. }
            | Self::ProblemReported { context, .. }
            | Self::ExpansionTooDeep { context, .. }
            | Self::OutputTooLarge { context, .. } => context.as_deref(),
        }
    }

    /// Get position in configuration text, if any
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::InvalidSyntax { position, .. } => *position,
            _ => None,
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::MissingArgument { .. } => codes::expansion::MISSING_ARGUMENT,
            Self::NoArgumentsGiven { .. } => codes::expansion::NO_ARGUMENTS_GIVEN,
            Self::WrongArgumentCount { .. } => codes::expansion::WRONG_ARGUMENT_COUNT,
            Self::InvalidSyntax { code, .. } => *code,
            Self::ProblemReported { .. } => codes::expansion::PROBLEM_REPORTED,
            Self::ExpansionTooDeep { .. } => codes::expansion::EXPANSION_TOO_DEEP,
            Self::OutputTooLarge { .. } => codes::expansion::OUTPUT_TOO_LARGE,
        }
    }

    /// Check if this error is an argument arity problem
    pub fn is_arity_error(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. }
                | Self::NoArgumentsGiven { .. }
                | Self::WrongArgumentCount { .. }
        )
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    /// Get error severity
    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    /// Get error description
    pub fn description(&self) -> &'static str {
        codes::get_description(self.error_code().as_str())
    }

    /// Get recommended action
    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }

    /// Log this error through the global logger
    pub fn report(&self) {
        let message = self.to_string();
        match self.context_segment() {
            Some(segment) => crate::log_error!(self.error_code(), &message,
                "segment" => segment,
                "category" => self.category()
            ),
            None => crate::log_error!(self.error_code(), &message,
                "category" => self.category()
            ),
        }
    }
}
