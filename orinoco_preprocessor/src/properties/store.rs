//! Line-oriented key/value configuration store
//!
//! Text format: one `key=value` record per line. A line starting with `#`
//! is a comment. The key is everything before the first `=`, the value
//! everything after it up to the line terminator (`\n` or `\r\n`).
//!
//! Records are applied one at a time; when a line is rejected, the lines
//! before it stay applied.

use super::property::{Property, PropertyValue, TextProperty};
use crate::config::compile_time::properties::{MAX_ENTRIES, MAX_LINE_LENGTH};
use crate::diagnostics::{PreprocessError, PreprocessResult};
use crate::logging::codes;
use crate::utils::Position;
use std::borrow::Cow;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Decides which property type backs a key and which keys are protected
pub trait PropertyPolicy {
    /// Build an empty property for a key seen for the first time
    fn create_property(&self, key: &str) -> PreprocessResult<Box<dyn Property>>;

    /// Entries installed when the store is created
    fn defaults(&self) -> Vec<(&'static str, Box<dyn Property>)> {
        Vec::new()
    }

    /// Protected keys silently survive `unset`
    fn is_protected(&self, _key: &str) -> bool {
        false
    }

    /// Map a key to the spelling it is stored under
    fn canonical_key<'k>(&self, key: &'k str) -> Cow<'k, str> {
        Cow::Borrowed(key)
    }
}

/// Stores every key as raw text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPolicy;

impl PropertyPolicy for TextPolicy {
    fn create_property(&self, _key: &str) -> PreprocessResult<Box<dyn Property>> {
        Ok(Box::new(TextProperty::default()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    Lenient,
    Strict,
}

/// Key to property mapping with a one-entry lookup cache
///
/// Not internally synchronized.
#[derive(Debug)]
pub struct PropertyStore<P: PropertyPolicy = TextPolicy> {
    policy: P,
    slots: Vec<(String, Box<dyn Property>)>,
    index: HashMap<String, usize>,
    last_accessed: Cell<Option<usize>>,
}

impl<P: PropertyPolicy + Default> Default for PropertyStore<P> {
    fn default() -> Self {
        Self::with_policy(P::default())
    }
}

impl<P: PropertyPolicy + Default> PropertyStore<P> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: PropertyPolicy> PropertyStore<P> {
    /// Create a store and install the policy's default entries
    pub fn with_policy(policy: P) -> Self {
        let defaults = policy.defaults();
        let mut store = Self {
            policy,
            slots: Vec::with_capacity(defaults.len()),
            index: HashMap::with_capacity(defaults.len()),
            last_accessed: Cell::new(None),
        };
        for (key, property) in defaults {
            store.set(key, property);
        }
        store
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    fn slot_of(&self, key: &str) -> Option<usize> {
        if let Some(i) = self.last_accessed.get() {
            if self.slots.get(i).map_or(false, |(k, _)| k == key) {
                return Some(i);
            }
        }
        let i = *self.index.get(key)?;
        self.last_accessed.set(Some(i));
        Some(i)
    }

    pub fn get(&self, key: &str) -> Option<&dyn Property> {
        let key = self.policy.canonical_key(key);
        let i = self.slot_of(&key)?;
        Some(self.slots[i].1.as_ref())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut dyn Property> {
        let key = self.policy.canonical_key(key).into_owned();
        let i = self.slot_of(&key)?;
        Some(self.slots[i].1.as_mut())
    }

    pub fn get_value(&self, key: &str) -> Option<PropertyValue> {
        self.get(key).map(|property| property.value())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_value(key).and_then(|value| value.as_bool())
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.get_value(key).and_then(|value| value.as_integer())
    }

    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.get_value(key)? {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace the property stored under `key`
    pub fn set(&mut self, key: &str, property: Box<dyn Property>) {
        let key = self.policy.canonical_key(key).into_owned();
        self.last_accessed.set(None);
        match self.index.get(&key) {
            Some(&i) => self.slots[i].1 = property,
            None => {
                self.index.insert(key.clone(), self.slots.len());
                self.slots.push((key, property));
            }
        }
    }

    /// Remove `key`; returns whether it was removed
    ///
    /// Protected keys are left in place without error.
    pub fn unset(&mut self, key: &str) -> bool {
        let key = self.policy.canonical_key(key).into_owned();
        if self.policy.is_protected(&key) {
            return false;
        }
        let Some(i) = self.index.remove(&key) else {
            return false;
        };

        self.last_accessed.set(None);
        self.slots.swap_remove(i);
        if let Some((moved, _)) = self.slots.get(i) {
            self.index.insert(moved.clone(), i);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Independent snapshot of the current keys
    pub fn keys(&self) -> BTreeSet<String> {
        self.slots.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Serialize every entry as `key=value\n`, sorted by key
    pub fn get_save_format(&self) -> String {
        let mut entries: Vec<&(String, Box<dyn Property>)> = self.slots.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::new();
        for (key, property) in entries {
            out.push_str(key);
            out.push('=');
            out.push_str(&property.save_format());
            out.push('\n');
        }
        out
    }

    /// Apply configuration text; end of input terminates the last record
    /// and a line without `=` is a key with an empty value
    pub fn load(&mut self, text: &str) -> PreprocessResult<usize> {
        self.load_with(text, LoadMode::Lenient)
    }

    /// Like `load`, but every record needs `=` and a terminating newline
    pub fn load_strict(&mut self, text: &str) -> PreprocessResult<usize> {
        self.load_with(text, LoadMode::Strict)
    }

    /// Read a file and `load` its contents
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> PreprocessResult<usize> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PreprocessError::invalid_syntax_with_code(
                codes::configuration::IO_ERROR,
                &format!("cannot read '{}': {}", path.display(), e),
                None,
            )
        })?;
        crate::log_info!("Loading configuration file", "path" => path.display());
        self.load(&text)
    }

    fn load_with(&mut self, text: &str, mode: LoadMode) -> PreprocessResult<usize> {
        crate::log_debug!("Loading configuration text",
            "bytes" => text.len(),
            "strict" => mode == LoadMode::Strict
        );

        let mut applied = 0;
        let mut position = Position::start();
        let mut rest = text;

        while !rest.is_empty() {
            let (line, terminated, consumed) = match rest.find('\n') {
                Some(end) => (&rest[..end], true, end + 1),
                None => (rest, false, rest.len()),
            };
            let line = line.strip_suffix('\r').unwrap_or(line);

            if !line.starts_with('#') {
                if let Err(error) = self.load_line(line, terminated, position, mode) {
                    error.report();
                    return Err(error);
                }
                applied += 1;
            }

            position = position.advance_str(&rest[..consumed]);
            rest = &rest[consumed..];
        }

        crate::log_success!(codes::success::CONFIGURATION_LOADED, "Configuration loaded",
            "records" => applied,
            "entries" => self.len()
        );
        Ok(applied)
    }

    fn load_line(
        &mut self,
        line: &str,
        terminated: bool,
        position: Position,
        mode: LoadMode,
    ) -> PreprocessResult<()> {
        if line.len() > MAX_LINE_LENGTH {
            return Err(PreprocessError::invalid_syntax_at(
                codes::configuration::LIMIT_EXCEEDED,
                &format!("line longer than {} bytes", MAX_LINE_LENGTH),
                position,
            ));
        }
        if mode == LoadMode::Strict && !terminated {
            return Err(PreprocessError::invalid_syntax_at(
                codes::configuration::INVALID_SYNTAX,
                "missing newline at end of input",
                position.advance_str(line),
            ));
        }

        let (key, value) = match line.find('=') {
            Some(eq) => (&line[..eq], &line[eq + 1..]),
            None if mode == LoadMode::Strict => {
                return Err(PreprocessError::invalid_syntax_at(
                    codes::configuration::NEWLINE_IN_KEY,
                    "newline while processing key",
                    position.advance_str(line),
                ));
            }
            None => (line, ""),
        };

        if key.is_empty() {
            return Err(PreprocessError::invalid_syntax_at(
                codes::configuration::EMPTY_KEY,
                "encountered empty key",
                position,
            ));
        }

        let value_position = position.advance_str(&line[..line.len() - value.len()]);
        self.apply_record(key, value)
            .map_err(|error| locate(error, value_position))
    }

    fn apply_record(&mut self, key: &str, value: &str) -> PreprocessResult<()> {
        if let Some(property) = self.get_mut(key) {
            return property.load(value);
        }

        if self.slots.len() >= MAX_ENTRIES {
            return Err(PreprocessError::invalid_syntax_with_code(
                codes::configuration::LIMIT_EXCEEDED,
                &format!("more than {} configuration entries", MAX_ENTRIES),
                None,
            ));
        }

        let mut property = self.policy.create_property(key)?;
        property.load(value)?;
        self.set(key, property);
        Ok(())
    }
}

/// Attach a position to errors that do not carry one yet
fn locate(error: PreprocessError, at: Position) -> PreprocessError {
    match error {
        PreprocessError::InvalidSyntax {
            message,
            position: None,
            code,
            context,
        } => PreprocessError::InvalidSyntax {
            message,
            position: Some(at),
            code,
            context,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::property::IntegerProperty;
    use assert_matches::assert_matches;
    use std::io::Write;

    /// Every key is an integer
    #[derive(Debug, Default)]
    struct IntegerPolicy;

    impl PropertyPolicy for IntegerPolicy {
        fn create_property(&self, _key: &str) -> PreprocessResult<Box<dyn Property>> {
            Ok(Box::new(IntegerProperty::default()))
        }
    }

    fn address(property: &dyn Property) -> *const u8 {
        property as *const dyn Property as *const u8
    }

    #[test]
    fn test_comment_line_is_discarded() {
        let mut store = PropertyStore::<IntegerPolicy>::new();
        store.load("# comment\nA=1\n").unwrap();

        assert_eq!(store.keys(), BTreeSet::from(["A".to_string()]));
        assert_eq!(store.get_integer("A"), Some(1));
    }

    #[test]
    fn test_hash_mid_line_is_not_a_comment() {
        let mut store = PropertyStore::<TextPolicy>::new();
        store.load("A=x # y\n").unwrap();
        assert_eq!(store.get_text("A").as_deref(), Some("x # y"));
    }

    #[test]
    fn test_existing_property_is_loaded_in_place() {
        let mut store = PropertyStore::<IntegerPolicy>::new();
        store.load("A=1\n").unwrap();
        let before = address(store.get("A").unwrap());

        store.load("A=2\n").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_integer("A"), Some(2));
        assert_eq!(address(store.get("A").unwrap()), before);

        store.load("A=1\nA=2\n").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(address(store.get("A").unwrap()), before);
    }

    #[test]
    fn test_line_without_equals_is_key_with_empty_value() {
        let mut store = PropertyStore::<TextPolicy>::new();
        store.load("onlykeynoequals\n").unwrap();
        assert_eq!(store.get_text("onlykeynoequals").as_deref(), Some(""));
    }

    #[test]
    fn test_value_may_contain_equals_and_be_empty() {
        let mut store = PropertyStore::<TextPolicy>::new();
        store.load("A=b=c\nB=\r\nC=last").unwrap();
        assert_eq!(store.get_text("A").as_deref(), Some("b=c"));
        assert_eq!(store.get_text("B").as_deref(), Some(""));
        assert_eq!(store.get_text("C").as_deref(), Some("last"));
    }

    #[test]
    fn test_empty_key_rejected_after_prior_lines_applied() {
        let mut store = PropertyStore::<TextPolicy>::new();
        let error = store.load("A=1\n=2\nB=3\n").unwrap_err();

        assert_matches!(&error, PreprocessError::InvalidSyntax { message, .. }
            if message == "encountered empty key");
        assert_eq!(error.position().map(|p| p.line), Some(2));
        assert!(store.contains_key("A"));
        assert!(!store.contains_key("B"));
    }

    #[test]
    fn test_rejected_line_is_logged() {
        let logger = crate::logging::install_memory_logger();
        let mut store = PropertyStore::<TextPolicy>::new();

        assert!(store.load("=orphan\n").is_err());
        assert!(logger.has_error_with_code(codes::configuration::EMPTY_KEY));
    }

    #[test]
    fn test_invalid_value_reports_value_position() {
        let mut store = PropertyStore::<IntegerPolicy>::new();
        let error = store.load("A=1\nB=x\n").unwrap_err();
        assert_eq!(error.error_code(), codes::configuration::INVALID_VALUE);
        assert_eq!(error.position(), Some(Position::new(6, 2, 3)));
        assert_eq!(store.get_integer("A"), Some(1));
    }

    #[test]
    fn test_strict_loading() {
        let mut store = PropertyStore::<TextPolicy>::new();

        let error = store.load_strict("A=1\nnokey\n").unwrap_err();
        assert_matches!(&error, PreprocessError::InvalidSyntax { message, .. }
            if message == "newline while processing key");
        assert_eq!(store.get_text("A").as_deref(), Some("1"));

        let error = store.load_strict("B=2").unwrap_err();
        assert_matches!(&error, PreprocessError::InvalidSyntax { message, .. }
            if message == "missing newline at end of input");
        assert!(!store.contains_key("B"));

        assert_eq!(store.load_strict("B=2\n# note\n").unwrap(), 1);
    }

    #[test]
    fn test_set_replaces_and_unset_removes() {
        let mut store = PropertyStore::<TextPolicy>::new();
        store.load("A=1\nB=2\nC=3\n").unwrap();

        store.set("B", Box::new(IntegerProperty::new(20)));
        assert_eq!(store.get_integer("B"), Some(20));

        assert!(store.unset("A"));
        assert!(!store.unset("A"));
        assert!(!store.contains_key("A"));
        assert_eq!(store.get_text("C").as_deref(), Some("3"));
        assert_eq!(store.get_integer("B"), Some(20));
    }

    #[test]
    fn test_cache_invalidated_by_unset() {
        let mut store = PropertyStore::<TextPolicy>::new();
        store.load("A=1\nB=2\n").unwrap();

        assert!(store.get("B").is_some());
        assert!(store.unset("B"));
        assert!(store.get("B").is_none());

        assert!(store.get("A").is_some());
        assert!(store.unset("A"));
        store.load("Z=9\n").unwrap();
        assert!(store.get("A").is_none());
        assert_eq!(store.get_text("Z").as_deref(), Some("9"));
    }

    #[test]
    fn test_keys_is_a_snapshot() {
        let mut store = PropertyStore::<TextPolicy>::new();
        store.load("A=1\n").unwrap();

        let mut keys = store.keys();
        keys.insert("B".to_string());
        keys.remove("A");

        assert!(store.contains_key("A"));
        assert!(!store.contains_key("B"));
    }

    #[test]
    fn test_save_format_round_trip() {
        let mut store = PropertyStore::<TextPolicy>::new();
        store.load("b=two words\na=x=y\nc=\n").unwrap();

        let saved = store.get_save_format();
        assert_eq!(saved, "a=x=y\nb=two words\nc=\n");

        let mut reloaded = PropertyStore::<TextPolicy>::new();
        reloaded.load_strict(&saved).unwrap();
        assert_eq!(reloaded.get_save_format(), saved);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# generated").unwrap();
        writeln!(file, "A=1").unwrap();
        file.flush().unwrap();

        let mut store = PropertyStore::<IntegerPolicy>::new();
        assert_eq!(store.load_file(file.path()).unwrap(), 1);
        assert_eq!(store.get_integer("A"), Some(1));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PropertyStore::<TextPolicy>::new();
        let error = store.load_file(dir.path().join("absent.properties")).unwrap_err();
        assert_eq!(error.error_code(), codes::configuration::IO_ERROR);
    }
}
