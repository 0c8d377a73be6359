//! Diagnostics raised by configuration loading and macro expansion
//!
//! Every error maps to a registered diagnostic code and may carry the segment
//! in whose expansion it occurred. The segment is advisory only.

pub mod error;

pub use error::{PreprocessError, PreprocessResult};
