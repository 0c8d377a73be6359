//! Configuration policy governing token emission
//!
//! Three fixed keys, matched case-insensitively and protected from removal.

use super::property::{BooleanProperty, IntegerProperty, Property};
use super::store::{PropertyPolicy, PropertyStore};
use crate::diagnostics::{PreprocessError, PreprocessResult};
use crate::logging::codes;
use std::borrow::Cow;

/// Retain `//` comments in emitted tokens
pub const KEEP_COMMENTS: &str = "keep_comments";
/// Emit newline tokens
pub const KEEP_NEWLINES: &str = "keep_newlines";
/// Longest run of consecutive newline tokens emitted
pub const MAX_NEWLINES: &str = "max_newlines";

pub const DEFAULT_KEYS: [&str; 3] = [KEEP_COMMENTS, KEEP_NEWLINES, MAX_NEWLINES];

#[derive(Debug, Clone, Copy, Default)]
pub struct PreprocessorPolicy;

impl PropertyPolicy for PreprocessorPolicy {
    fn create_property(&self, key: &str) -> PreprocessResult<Box<dyn Property>> {
        match self.canonical_key(key).as_ref() {
            KEEP_COMMENTS => Ok(Box::new(BooleanProperty::new(false))),
            KEEP_NEWLINES => Ok(Box::new(BooleanProperty::new(true))),
            MAX_NEWLINES => Ok(Box::new(IntegerProperty::new(i64::MAX))),
            _ => Err(PreprocessError::invalid_syntax_with_code(
                codes::configuration::UNKNOWN_KEY,
                &format!("unknown preprocessor configuration key '{}'", key),
                None,
            )),
        }
    }

    fn defaults(&self) -> Vec<(&'static str, Box<dyn Property>)> {
        DEFAULT_KEYS
            .iter()
            .filter_map(|key| self.create_property(key).ok().map(|property| (*key, property)))
            .collect()
    }

    fn is_protected(&self, key: &str) -> bool {
        DEFAULT_KEYS.contains(&self.canonical_key(key).as_ref())
    }

    fn canonical_key<'k>(&self, key: &'k str) -> Cow<'k, str> {
        match DEFAULT_KEYS.iter().find(|known| known.eq_ignore_ascii_case(key)) {
            Some(known) => Cow::Borrowed(*known),
            None => Cow::Borrowed(key),
        }
    }
}

/// Store carrying the preprocessor's emission policy
pub type PreprocessorConfiguration = PropertyStore<PreprocessorPolicy>;

impl PropertyStore<PreprocessorPolicy> {
    pub fn keep_comments(&self) -> bool {
        self.get_bool(KEEP_COMMENTS).unwrap_or(false)
    }

    pub fn keep_newlines(&self) -> bool {
        self.get_bool(KEEP_NEWLINES).unwrap_or(true)
    }

    /// Negative values are treated as zero
    pub fn max_newlines(&self) -> usize {
        let value = self.get_integer(MAX_NEWLINES).unwrap_or(i64::MAX);
        usize::try_from(value.max(0)).unwrap_or(usize::MAX)
    }
}
