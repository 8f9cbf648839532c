use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// String settings handed to a rule when it is configured.
///
/// The engine treats settings as opaque; only the rule interprets them.
/// Keys are kept sorted so that rendered configuration is stable.
///
/// # Examples
///
/// ```
/// use param_guard::RuleSettings;
///
/// let settings = RuleSettings::new().with("allowLinks", "TRUE");
/// assert!(settings.flag("allowLinks", false));
/// assert!(!settings.flag("allowAccents", false));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSettings(BTreeMap<String, String>);

impl RuleSettings {
    /// Creates empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a setting, returning the updated settings for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a setting.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the raw value of a setting.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns a setting that must be present.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Missing` if the key is absent.
    pub fn require(&self, key: &str) -> Result<&str, SettingsError> {
        self.get(key).ok_or_else(|| SettingsError::Missing {
            key: key.to_string(),
        })
    }

    /// Reads a boolean flag.
    ///
    /// `"true"` in any letter case is true, any other present value is false,
    /// and an absent key yields `default`.
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(value) => value.trim().eq_ignore_ascii_case("true"),
            None => default,
        }
    }

    /// Compiles a required regex setting.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Missing` if absent and `SettingsError::Invalid`
    /// if the pattern does not compile.
    pub fn regex(&self, key: &str) -> Result<Regex, SettingsError> {
        let pattern = self.require(key)?;
        Regex::new(pattern).map_err(|e| SettingsError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Returns true if no settings are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of settings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over settings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RuleSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_parses_like_a_lenient_boolean() {
        let settings = RuleSettings::new()
            .with("a", "true")
            .with("b", "True")
            .with("c", "yes")
            .with("d", "");

        assert!(settings.flag("a", false));
        assert!(settings.flag("b", false));
        assert!(!settings.flag("c", true));
        assert!(!settings.flag("d", true));
        assert!(settings.flag("missing", true));
    }

    #[test]
    fn require_reports_missing_key() {
        let settings = RuleSettings::new();
        let err = settings.require("pattern").unwrap_err();
        assert_eq!(
            err,
            SettingsError::Missing {
                key: "pattern".to_string()
            }
        );
    }

    #[test]
    fn regex_rejects_bad_pattern() {
        let settings = RuleSettings::new().with("pattern", "([a-z");
        let err = settings.regex("pattern").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { ref key, .. } if key == "pattern"));
    }

    #[test]
    fn settings_collect_and_iterate_in_key_order() {
        let settings: RuleSettings = vec![("b", "2"), ("a", "1")].into_iter().collect();
        let keys: Vec<_> = settings.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(settings.len(), 2);
        assert!(!settings.is_empty());
    }

    #[test]
    fn settings_serialize_as_plain_map() {
        let settings = RuleSettings::new().with("pattern", "[A-Z]+");
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"{"pattern":"[A-Z]+"}"#);
        let back: RuleSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
