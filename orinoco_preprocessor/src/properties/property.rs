//! Typed configuration properties
//!
//! Each property parses its value from text and writes a canonical text form
//! that parses back to an equal value.

use crate::diagnostics::{PreprocessError, PreprocessResult};
use crate::logging::codes;
use std::fmt;

/// Snapshot of a property's typed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A typed value stored under a configuration key
///
/// `load` leaves the current value untouched when it fails.
pub trait Property: fmt::Debug {
    fn load(&mut self, text: &str) -> PreprocessResult<()>;

    fn save_format(&self) -> String;

    fn value(&self) -> PropertyValue;
}

fn invalid_value(kind: &str, text: &str) -> PreprocessError {
    PreprocessError::invalid_syntax_with_code(
        codes::configuration::INVALID_VALUE,
        &format!("invalid {} value '{}'", kind, text),
        None,
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BooleanProperty {
    value: bool,
}

impl BooleanProperty {
    pub fn new(value: bool) -> Self {
        Self { value }
    }

    pub fn get(&self) -> bool {
        self.value
    }

    /// Accepts `0`, `1`, or `true`/`false` in any case
    pub fn parse(text: &str) -> PreprocessResult<bool> {
        if text.len() == 1 {
            return match u8::from_str_radix(text, 2) {
                Ok(bit) => Ok(bit == 1),
                Err(_) => Err(invalid_value("boolean", text)),
            };
        }
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(invalid_value("boolean", text))
        }
    }
}

impl Property for BooleanProperty {
    fn load(&mut self, text: &str) -> PreprocessResult<()> {
        self.value = Self::parse(text)?;
        Ok(())
    }

    fn save_format(&self) -> String {
        self.value.to_string()
    }

    fn value(&self) -> PropertyValue {
        PropertyValue::Boolean(self.value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerProperty {
    value: i64,
}

impl IntegerProperty {
    pub fn new(value: i64) -> Self {
        Self { value }
    }

    pub fn get(&self) -> i64 {
        self.value
    }
}

impl Property for IntegerProperty {
    fn load(&mut self, text: &str) -> PreprocessResult<()> {
        self.value = text
            .parse::<i64>()
            .map_err(|_| invalid_value("integer", text))?;
        Ok(())
    }

    fn save_format(&self) -> String {
        self.value.to_string()
    }

    fn value(&self) -> PropertyValue {
        PropertyValue::Integer(self.value)
    }
}

/// Raw text; stored and saved without transformation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextProperty {
    value: String,
}

impl TextProperty {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }

    pub fn get(&self) -> &str {
        &self.value
    }
}

impl Property for TextProperty {
    fn load(&mut self, text: &str) -> PreprocessResult<()> {
        self.value.clear();
        self.value.push_str(text);
        Ok(())
    }

    fn save_format(&self) -> String {
        self.value.clone()
    }

    fn value(&self) -> PropertyValue {
        PropertyValue::Text(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_boolean_parse_rules() {
        assert_eq!(BooleanProperty::parse("1").unwrap(), true);
        assert_eq!(BooleanProperty::parse("0").unwrap(), false);
        assert_eq!(BooleanProperty::parse("TRUE").unwrap(), true);
        assert_eq!(BooleanProperty::parse("fAlSe").unwrap(), false);

        for bad in ["2", "yes", "truee", "", "01", " true"] {
            assert_matches!(
                BooleanProperty::parse(bad),
                Err(PreprocessError::InvalidSyntax { .. }),
                "input {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_failed_load_keeps_value() {
        let mut prop = IntegerProperty::new(7);
        assert!(prop.load("seven").is_err());
        assert_eq!(prop.get(), 7);

        let mut flag = BooleanProperty::new(true);
        assert!(flag.load("maybe").is_err());
        assert!(flag.get());
    }

    #[test]
    fn test_round_trips() {
        for value in [true, false] {
            let mut prop = BooleanProperty::default();
            prop.load(&BooleanProperty::new(value).save_format()).unwrap();
            assert_eq!(prop.get(), value);
        }

        for value in [0, -1, 42, i64::MIN, i64::MAX] {
            let mut prop = IntegerProperty::default();
            prop.load(&IntegerProperty::new(value).save_format()).unwrap();
            assert_eq!(prop.value(), PropertyValue::Integer(value));
        }

        for value in ["", "plain", " spaced = and # hashed ", "ünïcode"] {
            let mut prop = TextProperty::default();
            prop.load(&TextProperty::new(value).save_format()).unwrap();
            assert_eq!(prop.get(), value);
        }
    }

    #[test]
    fn test_integer_parse_errors() {
        let mut prop = IntegerProperty::default();
        assert!(prop.load("-15").is_ok());
        assert_eq!(prop.get(), -15);
        assert_matches!(prop.load("1.5"), Err(PreprocessError::InvalidSyntax { code, .. })
            if code == codes::configuration::INVALID_VALUE);
        assert!(prop.load("99999999999999999999").is_err());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(PropertyValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::Integer(3).as_bool(), None);
        assert_eq!(PropertyValue::Text("x".into()).as_text(), Some("x"));
        assert_eq!(PropertyValue::Integer(3).type_name(), "integer");
    }
}
