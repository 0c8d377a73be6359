//! Configuration store with typed properties
//!
//! - **[`PropertyStore`]** - line-oriented `key=value` store with a lookup cache
//! - **[`Property`]** - boolean, integer and text values with canonical text forms
//! - **[`PreprocessorConfiguration`]** - store holding the token emission policy

pub mod preprocessor;
pub mod property;
pub mod store;

pub use preprocessor::{PreprocessorConfiguration, PreprocessorPolicy};
pub use property::{BooleanProperty, IntegerProperty, Property, PropertyValue, TextProperty};
pub use store::{PropertyPolicy, PropertyStore, TextPolicy};
