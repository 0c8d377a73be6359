//! Token model for expansion output
//!
//! [`TokenEmitter`] splits expanded text into [`Token`]s, honoring the comment
//! and newline settings of the preprocessor configuration.

pub mod emitter;
pub mod token;

pub use emitter::{SpannedToken, TokenEmitter};
pub use token::{Token, TokenClass};
