//! Recursive expansion of segment trees
//!
//! Substitution happens before pasting: `Glue` operands are expanded first
//! and the resulting strings are concatenated without re-tokenization.

use super::{MacroDefinition, MacroTable, Paren, Segment};
use crate::config::compile_time::expansion::{MAX_EXPANSION_DEPTH, MAX_OUTPUT_LENGTH};
use crate::diagnostics::{PreprocessError, PreprocessResult};

/// Expansion state for one top-level expansion pass
///
/// Tracks the macros currently being expanded so a macro's own name inside
/// its body renders literally, and bounds the nesting depth.
pub struct Expander<'t> {
    table: &'t dyn MacroTable,
    active: Vec<String>,
    /// Set below a `Sequence` whose validity has already been checked
    validated: bool,
}

impl<'t> Expander<'t> {
    pub fn new(table: &'t dyn MacroTable) -> Self {
        Self {
            table,
            active: Vec::new(),
            validated: false,
        }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Expand a segment tree with the given call-site arguments
    pub fn expand(&mut self, segment: &Segment, args: &[String]) -> PreprocessResult<String> {
        let mut out = String::new();
        self.expand_into(segment, args, &mut out)?;
        check_output_length(&out, segment)?;
        Ok(out)
    }

    /// Invoke `definition` with `args`, validating arity first
    pub fn invoke(
        &mut self,
        definition: &MacroDefinition,
        args: &[String],
    ) -> PreprocessResult<String> {
        definition.check_arity(args.len())?;
        self.expand_macro(definition, args, None)
    }

    fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|active| active == name)
    }

    fn expand_macro(
        &mut self,
        definition: &MacroDefinition,
        args: &[String],
        site: Option<&Segment>,
    ) -> PreprocessResult<String> {
        if self.active.len() >= MAX_EXPANSION_DEPTH {
            let error = PreprocessError::expansion_too_deep(definition.name(), MAX_EXPANSION_DEPTH);
            return Err(match site {
                Some(site) => error.with_context(site),
                None => error,
            });
        }

        self.active.push(definition.name().to_string());
        let result = self.with_validated(false, |this| this.expand(definition.body(), args));
        self.active.pop();
        result
    }

    fn expand_into(
        &mut self,
        segment: &Segment,
        args: &[String],
        out: &mut String,
    ) -> PreprocessResult<()> {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Word(name) => self.expand_word(segment, name, args, out)?,
            Segment::Argument { index, name } => match args.get(*index) {
                Some(value) => out.push_str(value),
                None => {
                    return Err(PreprocessError::missing_argument(*index, name).with_context(segment))
                }
            },
            Segment::Sequence(children) => {
                if self.validated {
                    self.expand_sequence(children, args, out)?;
                } else if segment.is_valid() {
                    self.with_validated(true, |this| this.expand_sequence(children, args, out))?;
                }
            }
            Segment::Paren(paren) => self.expand_paren(paren, args, out)?,
            Segment::Glue { left, right } => {
                // Operands are outside the enclosing sequence's validity
                let mut pasted = String::new();
                self.with_validated(false, |this| -> PreprocessResult<()> {
                    if let Some(left) = left {
                        this.expand_into(left, args, &mut pasted)?;
                    }
                    if let Some(right) = right {
                        this.expand_into(right, args, &mut pasted)?;
                    }
                    Ok(())
                })?;
                out.push_str(&pasted);
            }
            Segment::Error => {}
        }
        Ok(())
    }

    fn with_validated<R>(&mut self, validated: bool, f: impl FnOnce(&mut Self) -> R) -> R {
        let outer = std::mem::replace(&mut self.validated, validated);
        let result = f(self);
        self.validated = outer;
        result
    }

    fn expand_word(
        &mut self,
        segment: &Segment,
        name: &str,
        args: &[String],
        out: &mut String,
    ) -> PreprocessResult<()> {
        if self.is_active(name) {
            out.push_str(name);
            return Ok(());
        }

        let table = self.table;
        match table.lookup(name) {
            // Object-like macros see the caller's arguments
            Some(definition) if definition.arity() == 0 => {
                let text = self.expand_macro(definition, args, Some(segment))?;
                out.push_str(&text);
            }
            // Undefined names and parameterized macros without an argument group
            _ => out.push_str(name),
        }
        Ok(())
    }

    fn expand_sequence(
        &mut self,
        children: &[Segment],
        args: &[String],
        out: &mut String,
    ) -> PreprocessResult<()> {
        let mut iter = children.iter().peekable();
        while let Some(child) = iter.next() {
            if let (Segment::Word(name), Some(Segment::Paren(paren))) = (child, iter.peek()) {
                if self.try_nested_invocation(child, name, paren, args, out)? {
                    continue;
                }
            }
            self.expand_into(child, args, out)?;
        }
        Ok(())
    }

    /// Expand `name(paren)` as a call; returns false when it is not one
    fn try_nested_invocation(
        &mut self,
        site: &Segment,
        name: &str,
        paren: &Paren,
        args: &[String],
        out: &mut String,
    ) -> PreprocessResult<bool> {
        if self.is_active(name) {
            return Ok(false);
        }
        let table = self.table;
        let definition = match table.lookup(name) {
            Some(definition) if definition.arity() > 0 => definition,
            _ => return Ok(false),
        };

        let mut call_args = Vec::with_capacity(paren.children().len());
        for item in paren.children() {
            call_args.push(self.expand(item, args)?.trim().to_string());
        }
        // `NAME()` is one empty argument to a single-parameter macro
        if call_args.is_empty() && definition.arity() == 1 {
            call_args.push(String::new());
        }

        if definition.check_arity(call_args.len()).is_err() {
            crate::log_warning!("Macro call with mismatched arguments rendered literally",
                "macro" => name,
                "expected" => definition.arity(),
                "actual" => call_args.len()
            );
            return Ok(false);
        }

        paren.use_as_macro_argument();
        match self.expand_macro(definition, &call_args, Some(site)) {
            Ok(text) => {
                out.push_str(&text);
                Ok(true)
            }
            Err(error) => {
                paren.take_armed();
                Err(error)
            }
        }
    }

    fn expand_paren(
        &mut self,
        paren: &Paren,
        args: &[String],
        out: &mut String,
    ) -> PreprocessResult<()> {
        if paren.take_armed() {
            return Ok(());
        }

        out.push('(');
        for (i, child) in paren.children().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.expand_into(child, args, out)?;
        }
        out.push(')');
        Ok(())
    }
}

fn check_output_length(out: &str, segment: &Segment) -> PreprocessResult<()> {
    if out.len() > MAX_OUTPUT_LENGTH {
        return Err(PreprocessError::output_too_large(out.len(), MAX_OUTPUT_LENGTH).with_context(segment));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{parse_definition, MacroDefinitions};
    use assert_matches::assert_matches;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn seq(children: Vec<Segment>) -> Segment {
        Segment::Sequence(children)
    }

    fn table(definitions: &[&str]) -> MacroDefinitions {
        let mut table = MacroDefinitions::new();
        for text in definitions {
            table.define(parse_definition(text).unwrap());
        }
        table
    }

    #[test]
    fn test_leaf_expansion() {
        let empty = MacroDefinitions::new();
        assert_eq!(Segment::text("abc").expand(&empty, &[]).unwrap(), "abc");
        assert_eq!(Segment::word("UNDEFINED").expand(&empty, &[]).unwrap(), "UNDEFINED");
        assert_eq!(Segment::Error.expand(&empty, &[]).unwrap(), "");
        assert_eq!(
            Segment::argument(1, "b").expand(&empty, &args(&["x", "y"])).unwrap(),
            "y"
        );
    }

    #[test]
    fn test_missing_argument_carries_segment() {
        let empty = MacroDefinitions::new();
        let segment = Segment::argument(2, "c");
        let error = segment.expand(&empty, &args(&["a"])).unwrap_err();

        assert_matches!(error, PreprocessError::MissingArgument { index: 2, .. });
        assert_eq!(error.context_segment(), Some(&segment));
    }

    #[test]
    fn test_invalid_sequence_expands_empty() {
        let empty = MacroDefinitions::new();
        let tree = seq(vec![
            Segment::text("kept?"),
            seq(vec![Segment::Error]),
            Segment::argument(5, "never_reached"),
        ]);
        assert_eq!(tree.expand(&empty, &[]).unwrap(), "");
    }

    #[test]
    fn test_glue_pastes_after_substitution() {
        let empty = MacroDefinitions::new();
        let tree = Segment::glue(Some(Segment::argument(0, "a")), Some(Segment::argument(1, "b")));
        assert_eq!(tree.expand(&empty, &args(&["foo", "bar"])).unwrap(), "foobar");
        assert_eq!(Segment::glue(None, Some(Segment::text("r"))).expand(&empty, &[]).unwrap(), "r");
    }

    #[test]
    fn test_paren_armed_once() {
        let empty = MacroDefinitions::new();
        let tree = Segment::paren(vec![
            seq(vec![Segment::argument(0, "a")]),
            seq(vec![Segment::text("2")]),
        ]);
        let Segment::Paren(paren) = &tree else {
            unreachable!()
        };

        paren.use_as_macro_argument();
        assert_eq!(tree.expand(&empty, &args(&["1"])).unwrap(), "");
        assert_eq!(tree.expand(&empty, &args(&["1"])).unwrap(), "(1,2)");
        assert_eq!(tree.to_string_no_preprocessing(), "(a,2)");
    }

    #[test]
    fn test_object_like_word_resolution_and_undef() {
        let mut defs = table(&["ONE 1", "ALIAS ONE"]);
        let tree = seq(vec![Segment::word("ALIAS"), Segment::text("+"), Segment::word("ONE")]);

        assert_eq!(tree.expand(&defs, &[]).unwrap(), "1+1");

        defs.undefine("ONE");
        assert_eq!(tree.expand(&defs, &[]).unwrap(), "ONE+ONE");
    }

    #[test]
    fn test_object_like_word_forwards_caller_arguments() {
        let mut defs = MacroDefinitions::new();
        defs.define(MacroDefinition::new(
            "USES_ARG",
            Vec::new(),
            seq(vec![Segment::text("<"), Segment::argument(0, "x"), Segment::text(">")]),
        ));

        let tree = seq(vec![Segment::word("USES_ARG")]);
        assert_eq!(tree.expand(&defs, &args(&["v"])).unwrap(), "<v>");
    }

    #[test]
    fn test_bare_parameterized_word_renders_literally() {
        let defs = table(&["SQ(x) ((x)*(x))"]);
        let tree = seq(vec![Segment::word("SQ"), Segment::text(" + 1")]);
        assert_eq!(tree.expand(&defs, &[]).unwrap(), "SQ + 1");
    }

    #[test]
    fn test_nested_invocation_consumes_paren() {
        let defs = table(&["ADD(a,b) a+b"]);
        let body = crate::segment::parse_macro_body("ADD(x,2)*3", &args(&["x"]));

        assert_eq!(body.expand(&defs, &args(&["7"])).unwrap(), "7+2*3");
        // Flag consumed; reusable
        assert_eq!(body.expand(&defs, &args(&["8"])).unwrap(), "8+2*3");
    }

    #[test]
    fn test_nested_invocation_with_wrong_count_renders_literally() {
        let defs = table(&["ADD(a,b) a+b"]);
        let body = crate::segment::parse_macro_body("ADD(1)", &[]);
        assert_eq!(body.expand(&defs, &[]).unwrap(), "ADD(1)");
    }

    #[test]
    fn test_nested_call_arguments_are_trimmed_before_paste() {
        let defs = table(&["CAT(a,b) a ## b"]);
        let body = crate::segment::parse_macro_body("CAT(var_, n)", &args(&["n"]));
        assert_eq!(body.expand(&defs, &args(&["7"])).unwrap(), "var_7");
    }

    #[test]
    fn test_empty_group_is_one_empty_argument() {
        let defs = table(&["ID(x) [x]", "PAIR(a,b) a b"]);
        let body = crate::segment::parse_macro_body("ID()", &[]);
        assert_eq!(body.expand(&defs, &[]).unwrap(), "[]");

        let body = crate::segment::parse_macro_body("PAIR()", &[]);
        assert_eq!(body.expand(&defs, &[]).unwrap(), "PAIR()");
    }

    #[test]
    fn test_error_inside_glue_keeps_enclosing_sequence() {
        let empty = MacroDefinitions::new();
        let tree = seq(vec![Segment::text("keep"), Segment::glue(Some(Segment::Error), None)]);
        assert_eq!(tree.expand(&empty, &[]).unwrap(), "keep");

        // An invalid sequence operand still blanks itself
        let tree = seq(vec![
            Segment::text("a"),
            Segment::glue(Some(seq(vec![Segment::text("lost"), Segment::Error])), Some(Segment::text("b"))),
        ]);
        assert_eq!(tree.expand(&empty, &[]).unwrap(), "ab");
    }

    #[test]
    fn test_deeply_nested_sequences() {
        let empty = MacroDefinitions::new();
        let build = |leaf: Segment| {
            (0..500).fold(leaf, |inner, _| seq(vec![Segment::text("."), inner]))
        };

        assert_eq!(build(Segment::text("x")).expand(&empty, &[]).unwrap().len(), 501);
        assert_eq!(build(Segment::Error).expand(&empty, &[]).unwrap(), "");
    }

    #[test]
    fn test_self_reference_renders_literally() {
        let defs = table(&["LOOP LOOP+1", "A B", "B A"]);
        assert_eq!(seq(vec![Segment::word("LOOP")]).expand(&defs, &[]).unwrap(), "LOOP+1");
        assert_eq!(seq(vec![Segment::word("A")]).expand(&defs, &[]).unwrap(), "A");
    }

    #[test]
    fn test_invoke_validates_arity() {
        let defs = table(&["F(a) [a]", "G(a,b) a b"]);
        let f = defs.lookup("F").unwrap();
        let g = defs.lookup("G").unwrap();

        assert_matches!(
            Expander::new(&defs).invoke(f, &[]),
            Err(PreprocessError::NoArgumentsGiven { expected: 1, .. })
        );
        assert_matches!(
            Expander::new(&defs).invoke(g, &args(&["1"])),
            Err(PreprocessError::WrongArgumentCount { expected: 2, actual: 1, .. })
        );
        assert_eq!(Expander::new(&defs).invoke(f, &args(&["q"])).unwrap(), "[q]");
    }

    #[test]
    fn test_depth_limit() {
        let mut defs = MacroDefinitions::new();
        for i in 0..=MAX_EXPANSION_DEPTH {
            let body = Segment::word(&format!("M{}", i + 1));
            defs.define(MacroDefinition::new(&format!("M{}", i), Vec::new(), body));
        }

        let error = Segment::word("M0").expand(&defs, &[]).unwrap_err();
        assert_matches!(error, PreprocessError::ExpansionTooDeep { .. });
        assert!(error.context_segment().is_some());
    }
}
