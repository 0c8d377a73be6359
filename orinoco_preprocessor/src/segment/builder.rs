//! Builds segment trees from macro definition text
//!
//! Body grammar, scanned left to right:
//! - identifiers become `Argument` when they name a parameter, `Word` otherwise
//! - `##` becomes `Glue` of the neighbouring items, blanks around it dropped
//! - `(`...`)` becomes `Paren`; each comma-separated item is a `Sequence`
//! - any other run of characters is `Text`
//!
//! An unmatched `)` or an unclosed `(` yields an `Error` segment.

use super::{MacroDefinition, Segment};
use crate::diagnostics::{PreprocessError, PreprocessResult};
use crate::logging::codes;
use crate::utils::Position;

/// Parse macro body text into a `Sequence` tree
pub fn parse_macro_body(text: &str, parameters: &[String]) -> Segment {
    let mut parser = BodyParser::new(text, parameters);
    let (items, _) = parser.parse_items(false);
    Segment::Sequence(items)
}

/// Parse `NAME body` or `NAME(a,b) body` into a definition
pub fn parse_definition(text: &str) -> PreprocessResult<MacroDefinition> {
    let start = text.len() - text.trim_start().len();
    let rest = &text[start..];

    let name_len = identifier_len(rest);
    if name_len == 0 {
        return Err(malformed(text, start, "missing macro name"));
    }
    let name = &rest[..name_len];
    let mut offset = start + name_len;

    let mut parameters = Vec::new();
    if text[offset..].starts_with('(') {
        let close = match text[offset..].find(')') {
            Some(close) => offset + close,
            None => return Err(malformed(text, offset, "unterminated parameter list")),
        };
        let list = &text[offset + 1..close];
        if !list.trim().is_empty() {
            for raw in list.split(',') {
                let param = raw.trim();
                if param.is_empty() || identifier_len(param) != param.len() {
                    return Err(malformed(text, offset, &format!("invalid parameter '{}'", param)));
                }
                if parameters.iter().any(|p: &String| p == param) {
                    return Err(malformed(text, offset, &format!("duplicate parameter '{}'", param)));
                }
                parameters.push(param.to_string());
            }
        }
        offset = close + 1;
    }

    let body = parse_macro_body(text[offset..].trim(), &parameters);
    Ok(MacroDefinition::new(name, parameters, body))
}

fn malformed(text: &str, offset: usize, message: &str) -> PreprocessError {
    let position = Position::start().advance_str(&text[..offset]);
    PreprocessError::invalid_syntax_at(codes::expansion::MALFORMED_MACRO, message, position)
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte length of the identifier at the start of `text`
fn identifier_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if is_identifier_start(c) => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !is_identifier_continue(*c))
        .map_or(text.len(), |(i, _)| i)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    End,
    Comma,
    Close,
}

struct BodyParser<'a> {
    text: &'a str,
    pos: usize,
    parameters: &'a [String],
}

impl<'a> BodyParser<'a> {
    fn new(text: &'a str, parameters: &'a [String]) -> Self {
        Self {
            text,
            pos: 0,
            parameters,
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_paste(&self) -> bool {
        self.rest().starts_with("##")
    }

    fn parse_items(&mut self, nested: bool) -> (Vec<Segment>, Stop) {
        let mut items = Vec::new();
        loop {
            let Some(c) = self.peek() else {
                return (items, Stop::End);
            };
            match c {
                '(' => {
                    self.pos += 1;
                    items.push(self.parse_paren());
                }
                ')' => {
                    self.pos += 1;
                    if nested {
                        return (items, Stop::Close);
                    }
                    items.push(Segment::Error);
                }
                ',' if nested => {
                    self.pos += 1;
                    return (items, Stop::Comma);
                }
                _ if self.at_paste() => {
                    self.pos += 2;
                    let glue = self.parse_glue(&mut items, nested);
                    items.push(glue);
                }
                c if is_identifier_start(c) => items.push(self.take_identifier()),
                _ => items.push(Segment::Text(self.take_text(nested))),
            }
        }
    }

    /// Called after `(` has been consumed
    fn parse_paren(&mut self) -> Segment {
        let mut children = Vec::new();
        loop {
            let (items, stop) = self.parse_items(true);
            match stop {
                Stop::Comma => children.push(Segment::Sequence(items)),
                Stop::Close => {
                    if !children.is_empty() || !items.is_empty() {
                        children.push(Segment::Sequence(items));
                    }
                    return Segment::paren(children);
                }
                Stop::End => return Segment::Error,
            }
        }
    }

    /// Called after `##` has been consumed
    fn parse_glue(&mut self, items: &mut Vec<Segment>, nested: bool) -> Segment {
        if let Some(Segment::Text(text)) = items.last_mut() {
            let trimmed = text.trim_end().len();
            text.truncate(trimmed);
            if text.is_empty() {
                items.pop();
            }
        }
        let left = items.pop();

        let blanks = self.rest().len() - self.rest().trim_start().len();
        self.pos += blanks;

        let right = match self.peek() {
            None | Some(')') => None,
            Some(',') if nested => None,
            Some(_) if self.at_paste() => None,
            Some('(') => {
                self.pos += 1;
                Some(self.parse_paren())
            }
            Some(c) if is_identifier_start(c) => Some(self.take_identifier()),
            Some(_) => Some(Segment::Text(self.take_text(nested))),
        };

        Segment::glue(left, right)
    }

    fn take_identifier(&mut self) -> Segment {
        let len = identifier_len(self.rest());
        let name = &self.rest()[..len];
        self.pos += len;

        match self.parameters.iter().position(|p| p == name) {
            Some(index) => Segment::argument(index, name),
            None => Segment::word(name),
        }
    }

    fn take_text(&mut self, nested: bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let stop = matches!(c, '(' | ')')
                || (c == ',' && nested)
                || is_identifier_start(c)
                || self.at_paste();
            if stop {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.text[start..self.pos].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_words_arguments_and_text() {
        let tree = parse_macro_body("x + y1 * 2", &params(&["x"]));
        assert_eq!(
            tree,
            Segment::Sequence(vec![
                Segment::argument(0, "x"),
                Segment::text(" + "),
                Segment::word("y1"),
                Segment::text(" * 2"),
            ])
        );
    }

    #[test]
    fn test_paren_items_are_sequences() {
        let tree = parse_macro_body("f(a, b)()", &params(&["a"]));
        assert_eq!(
            tree,
            Segment::Sequence(vec![
                Segment::word("f"),
                Segment::paren(vec![
                    Segment::Sequence(vec![Segment::argument(0, "a")]),
                    Segment::Sequence(vec![Segment::text(" "), Segment::word("b")]),
                ]),
                Segment::paren(vec![]),
            ])
        );
    }

    #[test]
    fn test_glue_drops_surrounding_blanks() {
        let tree = parse_macro_body("a ## b ## c", &params(&["a", "b"]));
        assert_eq!(
            tree,
            Segment::Sequence(vec![Segment::glue(
                Some(Segment::glue(
                    Some(Segment::argument(0, "a")),
                    Some(Segment::argument(1, "b")),
                )),
                Some(Segment::word("c")),
            )])
        );
        assert_eq!(tree.to_string_no_preprocessing(), "a##b##c");
    }

    #[test]
    fn test_glue_with_missing_operands() {
        let tree = parse_macro_body("## x ##", &[]);
        assert_eq!(
            tree,
            Segment::Sequence(vec![Segment::glue(
                Some(Segment::glue(None, Some(Segment::word("x")))),
                None,
            )])
        );
    }

    #[test]
    fn test_unbalanced_parens_yield_error() {
        let unmatched = parse_macro_body("a)b", &[]);
        assert!(!unmatched.is_valid());

        let unclosed = parse_macro_body("f(a, b", &[]);
        assert!(!unclosed.is_valid());
        assert_eq!(unclosed.to_string_no_preprocessing(), "f");
    }

    #[test]
    fn test_round_trip_through_unexpanded_text() {
        let parameters = params(&["a", "b"]);
        let bodies = [
            "a+b",
            "(a) * (b)",
            "f(a, g(b, 1), ) ## tail",
            "#a # b",
            "a ## (b) ## 3",
            "",
            "x,y",
        ];
        for body in bodies {
            let tree = parse_macro_body(body, &parameters);
            let rendered = tree.to_string_no_preprocessing();
            assert_eq!(parse_macro_body(&rendered, &parameters), tree, "body: {:?}", body);
        }
    }

    #[test]
    fn test_parse_definition() {
        let def = parse_definition("  MAX(a, b) ((a) > (b) ? (a) : (b))  ").unwrap();
        assert_eq!(def.name(), "MAX");
        assert_eq!(def.parameters(), &params(&["a", "b"])[..]);
        assert_eq!(def.to_definition_string(), "MAX(a,b) ((a) > (b) ? (a) : (b))");

        let object = parse_definition("PI 3.14").unwrap();
        assert_eq!(object.arity(), 0);
        assert_eq!(object.body(), &Segment::Sequence(vec![Segment::text("3.14")]));

        // Space before '(' means the parenthesis belongs to the body
        let spaced = parse_definition("P (x)").unwrap();
        assert_eq!(spaced.arity(), 0);
    }

    #[test]
    fn test_malformed_definitions() {
        assert_matches!(
            parse_definition("  "),
            Err(PreprocessError::InvalidSyntax { code, .. }) if code == codes::expansion::MALFORMED_MACRO
        );
        assert_matches!(parse_definition("F(a, b"), Err(PreprocessError::InvalidSyntax { .. }));
        assert_matches!(parse_definition("F(a, 1)"), Err(PreprocessError::InvalidSyntax { .. }));
        assert_matches!(parse_definition("F(a, a)"), Err(PreprocessError::InvalidSyntax { .. }));

        let error = parse_definition("F(a,").unwrap_err();
        assert_eq!(error.position().map(|p| p.column), Some(2));
    }
}
