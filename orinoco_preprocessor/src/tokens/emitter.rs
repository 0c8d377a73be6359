//! Splits expansion output into tokens under the configured emission policy

use super::token::Token;
use crate::properties::PreprocessorConfiguration;
use crate::queue::TokenQueue;
use crate::utils::{Position, Span, Spanned};

pub type SpannedToken = Spanned<Token>;

/// Emission settings captured from a [`PreprocessorConfiguration`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEmitter {
    keep_comments: bool,
    keep_newlines: bool,
    max_newlines: usize,
}

impl Default for TokenEmitter {
    fn default() -> Self {
        Self {
            keep_comments: false,
            keep_newlines: true,
            max_newlines: usize::MAX,
        }
    }
}

impl TokenEmitter {
    pub fn new(config: &PreprocessorConfiguration) -> Self {
        Self {
            keep_comments: config.keep_comments(),
            keep_newlines: config.keep_newlines(),
            max_newlines: config.max_newlines(),
        }
    }

    /// Tokenize `text`, dropping what the policy excludes
    pub fn emit(&self, text: &str) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();
        let mut newline_run = 0usize;

        for spanned in Lexer::new(text) {
            match &spanned.value {
                Token::Newline => {
                    if !self.keep_newlines || newline_run >= self.max_newlines {
                        continue;
                    }
                    newline_run += 1;
                }
                Token::Comment(_) if !self.keep_comments => continue,
                Token::Whitespace(_) => {}
                _ => newline_run = 0,
            }
            tokens.push(spanned);
        }
        tokens
    }

    /// Tokenize `text` and hand the tokens to `queue`; returns the count
    pub fn emit_into(&self, text: &str, queue: &dyn TokenQueue<SpannedToken>) -> usize {
        let tokens = self.emit(text);
        let count = tokens.len();
        queue.add_all(tokens);
        count
    }
}

struct Lexer<'a> {
    rest: &'a str,
    position: Position,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            rest: text,
            position: Position::start(),
        }
    }

    fn scan_while(&self, skip: usize, pred: impl Fn(char) -> bool) -> usize {
        self.rest[skip..]
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map_or(self.rest.len(), |(i, _)| skip + i)
    }
}

impl Iterator for Lexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<SpannedToken> {
        let c = self.rest.chars().next()?;

        let (token, len) = if self.rest.starts_with("\r\n") {
            (Token::Newline, 2)
        } else if c == '\n' {
            (Token::Newline, 1)
        } else if self.rest.starts_with("//") {
            let len = self.rest.find(['\r', '\n']).unwrap_or(self.rest.len());
            (Token::Comment(self.rest[..len].to_string()), len)
        } else if c.is_whitespace() {
            let len = self.scan_while(0, |c| c.is_whitespace() && c != '\n' && c != '\r');
            let len = len.max(c.len_utf8());
            (Token::Whitespace(self.rest[..len].to_string()), len)
        } else if c.is_ascii_alphabetic() || c == '_' {
            let len = self.scan_while(1, |c| c.is_ascii_alphanumeric() || c == '_');
            (Token::Identifier(self.rest[..len].to_string()), len)
        } else if c.is_ascii_digit() {
            let len = self.scan_while(1, |c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
            (Token::Number(self.rest[..len].to_string()), len)
        } else {
            (Token::Punct(c), c.len_utf8())
        };

        let lexeme = &self.rest[..len];
        let span = Span::covering(self.position, lexeme);
        self.position = span.end();
        self.rest = &self.rest[len..];
        Some(Spanned::new(token, span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::ConcurrentQueue;

    fn kinds(tokens: &[SpannedToken]) -> Vec<Token> {
        tokens.iter().map(|t| t.value.clone()).collect()
    }

    fn config(text: &str) -> PreprocessorConfiguration {
        let mut config = PreprocessorConfiguration::new();
        config.load(text).unwrap();
        config
    }

    #[test]
    fn test_default_policy_drops_comments() {
        let emitter = TokenEmitter::new(&PreprocessorConfiguration::new());
        let tokens = emitter.emit("x1 = 42 // note\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                Token::Identifier("x1".into()),
                Token::Whitespace(" ".into()),
                Token::Punct('='),
                Token::Whitespace(" ".into()),
                Token::Number("42".into()),
                Token::Whitespace(" ".into()),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_keep_comments() {
        let emitter = TokenEmitter::new(&config("keep_comments=true\n"));
        let tokens = emitter.emit("a // c\r\nb");
        assert!(kinds(&tokens).contains(&Token::Comment("// c".into())));
        assert_eq!(tokens.last().map(|t| t.span.start().line), Some(2));
    }

    #[test]
    fn test_newline_policy() {
        let dropped = TokenEmitter::new(&config("keep_newlines=false\n"));
        assert!(!kinds(&dropped.emit("a\n\nb\n")).contains(&Token::Newline));

        let capped = TokenEmitter::new(&config("max_newlines=2\n"));
        let tokens = kinds(&capped.emit("a\n\n\n\nb\n \n\nc"));
        let newlines = |slice: &[Token]| slice.iter().filter(|t| **t == Token::Newline).count();
        assert_eq!(newlines(&tokens), 4);
        assert_eq!(tokens[0], Token::Identifier("a".into()));
        assert_eq!(tokens[3], Token::Identifier("b".into()));
    }

    #[test]
    fn test_spans_track_source() {
        let text = "ab + 1.5e3";
        let tokens = TokenEmitter::default().emit(text);
        let last = tokens.last().unwrap();
        assert_eq!(last.value, Token::Number("1.5e3".into()));
        assert_eq!(last.span.slice(text), "1.5e3");
    }

    #[test]
    fn test_lexer_scans_whole_runs() {
        let tokens: Vec<Token> = Lexer::new("foo_1 \t 07x9\r\n").map(|t| t.value).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("foo_1".into()),
                Token::Whitespace(" \t ".into()),
                Token::Number("07x9".into()),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_emit_into_queue() {
        let queue: ConcurrentQueue<SpannedToken> = ConcurrentQueue::new();
        let count = TokenEmitter::default().emit_into("f(x)", &queue);
        assert_eq!(count, 4);
        assert_eq!(queue.len(), 4);
    }
}
