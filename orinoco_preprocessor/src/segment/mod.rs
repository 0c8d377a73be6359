//! Macro body representation
//!
//! A macro body is a tree of [`Segment`]s built once when the definition is
//! parsed. Expansion walks the tree, substituting call-site arguments,
//! resolving words against a [`MacroTable`] and pasting `##` operands after
//! substitution.
//!
//! ## Components
//!
//! - **[`Segment`]** - closed set of node kinds
//! - **[`Paren`]** - parenthesized group with the one-shot argument-list flag
//! - **[`MacroDefinition`] / [`MacroDefinitions`]** - owners of body trees
//! - **[`parse_macro_body`] / [`parse_definition`]** - text to tree

pub mod builder;
pub mod definition;
pub mod expand;

pub use builder::{parse_definition, parse_macro_body};
pub use definition::{MacroDefinition, MacroDefinitions, MacroTable};
pub use expand::Expander;

use crate::diagnostics::PreprocessResult;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// One node of a macro body's expansion tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal characters, reproduced verbatim
    Text(String),
    /// Bare identifier resolved against the macro table at expansion time
    Word(String),
    /// Placeholder for the call-site argument at `index`
    Argument { index: usize, name: String },
    /// Ordered children, concatenated without separator
    Sequence(Vec<Segment>),
    /// Parenthesized, comma-separated group
    Paren(Paren),
    /// Token paste of two already-substituted operands
    Glue {
        left: Option<Box<Segment>>,
        right: Option<Box<Segment>>,
    },
    /// Syntactically invalid region
    Error,
}

impl Segment {
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }

    pub fn word(name: &str) -> Self {
        Self::Word(name.to_string())
    }

    pub fn argument(index: usize, name: &str) -> Self {
        Self::Argument {
            index,
            name: name.to_string(),
        }
    }

    pub fn glue(left: Option<Segment>, right: Option<Segment>) -> Self {
        Self::Glue {
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    pub fn paren(children: Vec<Segment>) -> Self {
        Self::Paren(Paren::new(children))
    }

    /// Expand this tree against `table` with the given call-site arguments
    pub fn expand(&self, table: &dyn MacroTable, args: &[String]) -> PreprocessResult<String> {
        Expander::new(table).expand(self, args)
    }

    /// Render the tree as macro-definition text without any substitution
    pub fn to_string_no_preprocessing(&self) -> String {
        let mut out = String::new();
        self.write_unexpanded(&mut out);
        out
    }

    fn write_unexpanded(&self, out: &mut String) {
        match self {
            Self::Text(text) | Self::Word(text) => out.push_str(text),
            Self::Argument { name, .. } => out.push_str(name),
            Self::Sequence(children) => {
                for child in children {
                    child.write_unexpanded(out);
                }
            }
            Self::Paren(paren) => {
                out.push('(');
                for (i, child) in paren.children().iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    child.write_unexpanded(out);
                }
                out.push(')');
            }
            Self::Glue { left, right } => {
                if let Some(left) = left {
                    left.write_unexpanded(out);
                }
                out.push_str("##");
                if let Some(right) = right {
                    right.write_unexpanded(out);
                }
            }
            Self::Error => {}
        }
    }

    /// False iff this is an `Error`, or a sequence or paren group with an
    /// `Error` reachable through nested sequences and paren groups.
    /// `Glue` operands are not inspected.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Error => false,
            Self::Sequence(children) => children.iter().all(Segment::is_valid),
            Self::Paren(paren) => paren.children().iter().all(Segment::is_valid),
            Self::Text(_) | Self::Word(_) | Self::Argument { .. } | Self::Glue { .. } => true,
        }
    }

    /// Highest argument index referenced anywhere in the tree
    pub fn max_argument_index(&self) -> Option<usize> {
        match self {
            Self::Argument { index, .. } => Some(*index),
            Self::Sequence(children) => children.iter().filter_map(Segment::max_argument_index).max(),
            Self::Paren(paren) => paren
                .children()
                .iter()
                .filter_map(Segment::max_argument_index)
                .max(),
            Self::Glue { left, right } => {
                let l = left.as_deref().and_then(Segment::max_argument_index);
                let r = right.as_deref().and_then(Segment::max_argument_index);
                l.max(r)
            }
            Self::Text(_) | Self::Word(_) | Self::Error => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_no_preprocessing())
    }
}

/// Parenthesized group; children are the comma-separated items
///
/// Carries a one-shot flag armed by [`Paren::use_as_macro_argument`]. The
/// next expansion of an armed group yields empty text and clears the flag.
/// Equality and cloning ignore the flag.
#[derive(Debug, Default)]
pub struct Paren {
    children: Vec<Segment>,
    used_as_macro_argument: AtomicBool,
}

impl Paren {
    pub fn new(children: Vec<Segment>) -> Self {
        Self {
            children,
            used_as_macro_argument: AtomicBool::new(false),
        }
    }

    pub fn children(&self) -> &[Segment] {
        &self.children
    }

    /// Arm the group: it has been consumed as a macro's argument list
    pub fn use_as_macro_argument(&self) {
        self.used_as_macro_argument.store(true, Ordering::SeqCst);
    }

    /// Whether the group is currently armed
    pub fn is_armed(&self) -> bool {
        self.used_as_macro_argument.load(Ordering::SeqCst)
    }

    /// Clear the flag, returning whether it was set
    pub(crate) fn take_armed(&self) -> bool {
        self.used_as_macro_argument.swap(false, Ordering::SeqCst)
    }
}

impl Clone for Paren {
    fn clone(&self) -> Self {
        Self::new(self.children.clone())
    }
}

impl PartialEq for Paren {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl Eq for Paren {}
