use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One declared setting in an agent profile's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingSpec {
    pub key: &'static str,
    pub required: bool,
}

impl SettingSpec {
    #[must_use]
    pub const fn required(key: &'static str) -> Self {
        Self {
            key,
            required: true,
        }
    }

    #[must_use]
    pub const fn optional(key: &'static str) -> Self {
        Self {
            key,
            required: false,
        }
    }
}

/// A scalar setting value as supplied by the operator.
///
/// Deserialized untagged, so YAML `true`, `42`, `1.5` and `"text"` map to
/// the matching variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl SettingValue {
    /// Whether the value counts as "configured" for presence checks.
    ///
    /// Empty strings, `false` and zero are treated as not configured.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for SettingValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// Raw settings as supplied by the host: key → optional value.
///
/// A key mapped to `None` (YAML `null`) is treated the same as an absent key.
pub type RawSettings = BTreeMap<String, Option<SettingValue>>;

/// The mutually exclusive secret-source keys and the flag that selects
/// between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretSource {
    /// Setting holding a path to the secret on disk.
    pub by_path: &'static str,
    /// Setting holding the secret inline.
    pub by_value: &'static str,
    /// Boolean setting telling the agent to read `by_path`.
    pub use_path_flag: &'static str,
}
