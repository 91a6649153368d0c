//! Settings resolution: raw operator settings → validated `ResolvedSettings`.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::BTreeMap;

use agentctl_common::{RawSettings, SecretSource, SettingSpec, SettingValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings that passed resolution, keyed by their declared (hyphenated) name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedSettings(BTreeMap<String, SettingValue>);

impl ResolvedSettings {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, SettingValue)> for ResolvedSettings {
    fn from_iter<I: IntoIterator<Item = (String, SettingValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The raw settings are not yet sufficient. Callers defer and retry later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incomplete {
    #[error("missing required settings: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("either {by_path} or {by_value} must be configured")]
    MissingSecret {
        by_path: &'static str,
        by_value: &'static str,
    },
}

/// Read a raw value, treating explicit `null` as unset.
fn lookup<'a>(raw: &'a RawSettings, key: &str) -> Option<&'a SettingValue> {
    raw.get(key).and_then(Option::as_ref)
}

fn is_configured(raw: &RawSettings, key: &str) -> bool {
    lookup(raw, key).is_some_and(SettingValue::is_truthy)
}

/// Resolve raw settings against a schema.
///
/// Both secret sources configured → the inline value wins and the
/// use-path flag is forced to `false`, overriding any raw value. Neither
/// configured → `Incomplete`, even though each key is individually optional.
///
/// # Errors
///
/// Returns `Incomplete` when a required key is unset or no secret source is
/// configured.
pub fn resolve(
    raw: &RawSettings,
    schema: &[SettingSpec],
    secret: Option<&SecretSource>,
) -> Result<ResolvedSettings, Incomplete> {
    let mut overrides: BTreeMap<&str, SettingValue> = BTreeMap::new();

    if let Some(secret) = secret {
        let by_path = is_configured(raw, secret.by_path);
        let by_value = is_configured(raw, secret.by_value);
        if !by_path && !by_value {
            return Err(Incomplete::MissingSecret {
                by_path: secret.by_path,
                by_value: secret.by_value,
            });
        }
        if by_path && by_value {
            tracing::warn!(
                by_path = secret.by_path,
                by_value = secret.by_value,
                "both secret sources configured; prioritizing {}",
                secret.by_value
            );
            overrides.insert(secret.use_path_flag, SettingValue::Bool(false));
        }
    }

    let mut missing = Vec::new();
    let mut resolved = BTreeMap::new();
    for spec in schema {
        let value = overrides
            .get(spec.key)
            .or_else(|| lookup(raw, spec.key))
            .cloned();
        match value {
            Some(v) => {
                resolved.insert(spec.key.to_string(), v);
            }
            None if spec.required => missing.push(spec.key.to_string()),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(Incomplete::MissingRequired(missing));
    }
    Ok(ResolvedSettings(resolved))
}
