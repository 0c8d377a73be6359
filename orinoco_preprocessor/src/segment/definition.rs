//! Macro definitions and the table that resolves words during expansion

use super::{Expander, Segment};
use crate::diagnostics::{PreprocessError, PreprocessResult};
use std::collections::HashMap;

/// Name-to-definition lookup consulted when a `Word` is expanded
pub trait MacroTable {
    fn lookup(&self, name: &str) -> Option<&MacroDefinition>;

    fn is_defined(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

/// A macro definition; exclusively owns its body tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    name: String,
    parameters: Vec<String>,
    body: Segment,
}

impl MacroDefinition {
    /// Create a definition, taking ownership of `body`
    pub fn new(name: &str, parameters: Vec<String>, body: Segment) -> Self {
        Self {
            name: name.to_string(),
            parameters,
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn body(&self) -> &Segment {
        &self.body
    }

    /// Number of declared parameters; zero for object-like macros
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_function_like(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Validate a call-site argument count against the declared arity
    pub fn check_arity(&self, actual: usize) -> PreprocessResult<()> {
        let expected = self.arity();
        if expected > 0 && actual == 0 {
            return Err(PreprocessError::no_arguments_given(&self.name, expected));
        }
        if expected != actual {
            return Err(PreprocessError::wrong_argument_count(&self.name, expected, actual));
        }
        Ok(())
    }

    /// Expand this macro's body with `args` after validating arity
    pub fn invoke(&self, table: &dyn MacroTable, args: &[String]) -> PreprocessResult<String> {
        Expander::new(table).invoke(self, args)
    }

    /// Reconstruct the `#define` text (without the directive)
    pub fn to_definition_string(&self) -> String {
        let body = self.body.to_string_no_preprocessing();
        if self.is_function_like() {
            format!("{}({}) {}", self.name, self.parameters.join(","), body)
        } else if body.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, body)
        }
    }
}

/// Hash-backed macro table supporting redefinition and removal
#[derive(Debug, Clone, Default)]
pub struct MacroDefinitions {
    definitions: HashMap<String, MacroDefinition>,
}

impl MacroDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a definition; returns the replaced one
    pub fn define(&mut self, definition: MacroDefinition) -> Option<MacroDefinition> {
        self.definitions
            .insert(definition.name().to_string(), definition)
    }

    /// Remove a definition; references to it render literally afterwards
    pub fn undefine(&mut self, name: &str) -> Option<MacroDefinition> {
        self.definitions.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Defined names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn clear(&mut self) {
        self.definitions.clear();
    }
}

impl MacroTable for MacroDefinitions {
    fn lookup(&self, name: &str) -> Option<&MacroDefinition> {
        self.definitions.get(name)
    }
}
