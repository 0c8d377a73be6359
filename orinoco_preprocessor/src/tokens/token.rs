//! Tokens produced from expansion output
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lexical tokens handed to the downstream consumer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    /// Identifier or keyword (`[A-Za-z_][A-Za-z0-9_]*`)
    Identifier(String),
    /// Number, including any trailing letters, digits, `.` or `_`
    Number(String),
    /// Single punctuation character
    Punct(char),
    /// Run of blanks other than newline
    Whitespace(String),
    /// Line terminator
    Newline,
    /// `//` line comment without its terminator
    Comment(String),
}

impl Token {
    /// Source spelling of this token
    pub fn as_source(&self) -> String {
        match self {
            Self::Identifier(s) | Self::Number(s) | Self::Whitespace(s) | Self::Comment(s) => {
                s.clone()
            }
            Self::Punct(c) => c.to_string(),
            Self::Newline => "\n".to_string(),
        }
    }

    /// Whether the token matters to the statement parser
    pub fn is_significant(&self) -> bool {
        !matches!(self, Self::Whitespace(_) | Self::Newline | Self::Comment(_))
    }

    pub fn class(&self) -> TokenClass {
        match self {
            Self::Identifier(_) => TokenClass::Identifier,
            Self::Number(_) => TokenClass::Literal,
            Self::Punct(_) => TokenClass::Operation,
            Self::Whitespace(_) | Self::Newline => TokenClass::Whitespace,
            Self::Comment(_) => TokenClass::Special,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_source())
    }
}

/// Token classification for downstream consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Identifier,
    Literal,
    Operation,
    Whitespace,
    Special,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_spelling() {
        assert_eq!(Token::Punct('+').to_string(), "+");
        assert_eq!(Token::Newline.to_string(), "\n");
        assert_eq!(Token::Comment("// x".into()).as_source(), "// x");
    }

    #[test]
    fn test_significance() {
        assert!(Token::Identifier("a".into()).is_significant());
        assert!(!Token::Whitespace(" ".into()).is_significant());
        assert_eq!(Token::Comment(String::new()).class(), TokenClass::Special);
    }
}
