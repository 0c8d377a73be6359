//! Source location types shared by diagnostics, log events and tokens

pub mod span;

pub use span::{Position, Span, Spanned};
