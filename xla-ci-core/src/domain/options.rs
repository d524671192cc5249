//! Ordered option maps and their command-line rendering

use serde::{Serialize, Serializer};
use std::fmt;

/// Value of a bazel option, docker option or environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => write!(f, "True"),
            OptionValue::Bool(false) => write!(f, "False"),
            OptionValue::Int(value) => write!(f, "{}", value),
            OptionValue::Str(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

/// Insertion-ordered map from option name to value
///
/// Setting a key that already exists replaces its value in place, so a map
/// built from defaults plus overrides keeps the defaults' ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    /// Creates an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry and returns the map, for chaining
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Adds or replaces an entry
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Appends every entry of `other`, replacing keys already present
    pub fn extend(mut self, other: &OptionMap) -> Self {
        for (key, value) in other.iter() {
            self.set(key, value.clone());
        }
        self
    }

    /// Looks up a value by name
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Iterates entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders entries as CLI flags
    ///
    /// `true` becomes a bare `--name`; any other value, `false` included,
    /// becomes `--name=value`.
    pub fn to_cli_options(&self) -> Vec<String> {
        self.iter()
            .map(|(key, value)| match value {
                OptionValue::Bool(true) => format!("--{}", key),
                other => format!("--{}={}", key, other),
            })
            .collect()
    }

    /// Renders entries as `--<flag>=KEY=VALUE` tokens, one per entry
    pub fn to_env_flags(&self, flag: &str) -> Vec<String> {
        self.iter()
            .map(|(key, value)| format!("--{}={}={}", flag, key, value))
            .collect()
    }
}

impl Serialize for OptionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_renders_bare_flag() {
        let options = OptionMap::new().with("keep_going", true);
        assert_eq!(options.to_cli_options(), vec!["--keep_going"]);
    }

    #[test]
    fn test_false_renders_with_value() {
        let options = OptionMap::new().with("keep_going", false);
        assert_eq!(options.to_cli_options(), vec!["--keep_going=False"]);
    }

    #[test]
    fn test_values_render_in_insertion_order() {
        let options = OptionMap::new()
            .with("test_output", "errors")
            .with("jobs", 150)
            .with("verbose_failures", true);

        assert_eq!(
            options.to_cli_options(),
            vec!["--test_output=errors", "--jobs=150", "--verbose_failures"]
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut options = OptionMap::new().with("a", 1).with("b", 2);
        options.set("a", 3);

        let keys: Vec<&str> = options.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(options.get("a"), Some(&OptionValue::Int(3)));
    }

    #[test]
    fn test_extend_appends_overrides() {
        let defaults = OptionMap::new().with("jobs", 150);
        let options = defaults
            .clone()
            .extend(&OptionMap::new().with("build_tests_only", true));

        assert_eq!(options.to_cli_options(), vec!["--jobs=150", "--build_tests_only"]);
        // The defaults are copied, not aliased
        assert_eq!(defaults.len(), 1);
    }

    #[test]
    fn test_serializes_as_map() {
        let options = OptionMap::new().with("profile", "profile.json.gz").with("keep_going", true);
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            serde_json::json!({"profile": "profile.json.gz", "keep_going": true})
        );
    }

    #[test]
    fn test_env_flags() {
        let env = OptionMap::new()
            .with("JAX_NUM_GENERATED_CASES", 25)
            .with("JAX_SKIP_SLOW_TESTS", 1);

        assert_eq!(
            env.to_env_flags("test_env"),
            vec![
                "--test_env=JAX_NUM_GENERATED_CASES=25",
                "--test_env=JAX_SKIP_SLOW_TESTS=1"
            ]
        );
    }
}
