//! Macro preprocessing core for the Orinoco scripting language
//!
//! Expands object-like and function-like macros, including `##` token
//! pasting, into text ahead of lexing. The expansion policy lives in a
//! line-oriented configuration store, and expanded tokens travel to the
//! downstream consumer through a concurrent hand-off queue.

pub mod config;
pub mod diagnostics;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod properties;
pub mod queue;
pub mod segment;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use diagnostics::{PreprocessError, PreprocessResult};
pub use pipeline::{Preprocessor, PreprocessorStats};
pub use properties::{PreprocessorConfiguration, PropertyStore};
pub use queue::{ConcurrentQueue, TokenQueue};
pub use segment::{MacroDefinition, MacroDefinitions, MacroTable, Segment};
pub use tokens::{SpannedToken, Token};
