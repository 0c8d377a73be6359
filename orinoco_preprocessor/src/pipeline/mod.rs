//! Preprocessing pipeline
//!
//! Composes the macro table, the emission configuration and the token queue:
//! a macro is looked up, its body expanded with the call-site arguments, and
//! the output either appended to a buffer or tokenized onto the queue for a
//! downstream consumer.

mod stats;

pub use stats::PreprocessorStats;

use crate::config::RuntimeConfig;
use crate::diagnostics::{PreprocessError, PreprocessResult};
use crate::logging::codes;
use crate::properties::PreprocessorConfiguration;
use crate::queue::ConcurrentQueue;
use crate::segment::{parse_definition, MacroDefinition, MacroDefinitions, MacroTable};
use crate::tokens::{SpannedToken, TokenEmitter};
use std::sync::Arc;
use std::time::Instant;

pub struct Preprocessor {
    macros: MacroDefinitions,
    configuration: PreprocessorConfiguration,
    queue: Arc<ConcurrentQueue<SpannedToken>>,
    preferences: RuntimeConfig,
    stats: PreprocessorStats,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::with_preferences(RuntimeConfig::default())
    }

    pub fn with_preferences(preferences: RuntimeConfig) -> Self {
        Self {
            macros: MacroDefinitions::new(),
            configuration: PreprocessorConfiguration::new(),
            queue: Arc::new(ConcurrentQueue::new()),
            preferences,
            stats: PreprocessorStats::default(),
        }
    }

    /// Emit into an existing queue instead of a private one
    pub fn with_queue(mut self, queue: Arc<ConcurrentQueue<SpannedToken>>) -> Self {
        self.queue = queue;
        self
    }

    pub fn macros(&self) -> &MacroDefinitions {
        &self.macros
    }

    pub fn configuration(&self) -> &PreprocessorConfiguration {
        &self.configuration
    }

    pub fn preferences(&self) -> &RuntimeConfig {
        &self.preferences
    }

    pub fn stats(&self) -> &PreprocessorStats {
        &self.stats
    }

    /// Shared handle to the output queue
    pub fn queue(&self) -> Arc<ConcurrentQueue<SpannedToken>> {
        Arc::clone(&self.queue)
    }

    /// Parse and install `NAME body` / `NAME(params) body`
    pub fn define(&mut self, text: &str) -> PreprocessResult<()> {
        let definition = parse_definition(text).map_err(|error| {
            error.report();
            error
        })?;
        self.define_macro(definition);
        Ok(())
    }

    pub fn define_macro(&mut self, definition: MacroDefinition) {
        let name = definition.name().to_string();
        let previous = self.macros.define(definition);
        self.stats.definitions += 1;

        if self.preferences.expansion.log_definitions {
            crate::log_success!(codes::success::MACRO_DEFINED, "Macro defined",
                "macro" => &name,
                "redefined" => previous.is_some()
            );
        }
    }

    /// Remove a macro; later references to it render literally
    pub fn undefine(&mut self, name: &str) -> bool {
        let removed = self.macros.undefine(name).is_some();
        if removed && self.preferences.expansion.log_definitions {
            crate::log_success!(codes::success::MACRO_UNDEFINED, "Macro undefined",
                "macro" => name
            );
        }
        removed
    }

    /// Apply configuration text to the emission policy
    pub fn configure(&mut self, text: &str) -> PreprocessResult<usize> {
        let applied = if self.preferences.properties.strict_loading {
            self.configuration.load_strict(text)?
        } else {
            self.configuration.load(text)?
        };

        if self.preferences.properties.log_records {
            for key in self.configuration.keys() {
                if let Some(value) = self.configuration.get_value(&key) {
                    crate::log_info!("Configuration record", "key" => &key, "value" => value);
                }
            }
        }
        Ok(applied)
    }

    /// Expand macro `name` with `args`; an undefined name expands to itself
    ///
    /// With the report-and-continue preference a failed expansion is logged
    /// and yields empty text.
    pub fn expand(&mut self, name: &str, args: &[String]) -> PreprocessResult<String> {
        match self.try_expand(name, args) {
            Ok(text) => Ok(text),
            Err(_) if self.preferences.expansion.report_and_continue => Ok(String::new()),
            Err(error) => Err(error),
        }
    }

    /// Expand and append the output to `out`
    pub fn expand_into(
        &mut self,
        name: &str,
        args: &[String],
        out: &mut String,
    ) -> PreprocessResult<()> {
        let text = self.expand(name, args)?;
        out.push_str(&text);
        Ok(())
    }

    /// Expand, reporting any error and producing empty text instead
    pub fn expand_or_empty(&mut self, name: &str, args: &[String]) -> String {
        self.try_expand(name, args).unwrap_or_default()
    }

    /// Expand, tokenize under the configured policy and queue the tokens
    pub fn emit(&mut self, name: &str, args: &[String]) -> PreprocessResult<usize> {
        let text = self.expand(name, args)?;
        let count = TokenEmitter::new(&self.configuration).emit_into(&text, self.queue.as_ref());
        self.stats.tokens_emitted += count;
        Ok(count)
    }

    /// Expand; errors are reported before being returned
    fn try_expand(&mut self, name: &str, args: &[String]) -> PreprocessResult<String> {
        let start = Instant::now();
        self.stats.expansions += 1;

        let result = match self.macros.lookup(name) {
            Some(definition) => definition.invoke(&self.macros, args),
            None => Ok(name.to_string()),
        };
        self.stats.total_expansion_time += start.elapsed();

        match result {
            Ok(text) => {
                self.stats.bytes_expanded += text.len();
                if self.preferences.expansion.log_expansions {
                    crate::log_success!(codes::success::EXPANSION_COMPLETE, "Expansion complete",
                        "macro" => name,
                        "bytes" => text.len()
                    );
                }
                Ok(text)
            }
            Err(error) => {
                self.stats.failed_expansions += 1;
                error.report();
                Err(error)
            }
        }
    }

    /// Report an externally detected problem through the error channel
    pub fn report_problem(&self, message: &str, detail: Option<&dyn std::fmt::Display>) -> PreprocessError {
        let error = PreprocessError::problem_reported(message, detail);
        error.report();
        error
    }
}
