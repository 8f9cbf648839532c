//! Loading chain tables from configuration documents.
//!
//! The document is deserialized into plain records ([`ChainTableConfig`]),
//! then [`Loader::build`] compiles the patterns and checks every rule
//! identifier against the registry. Any structural problem fails the whole
//! load; a table is never built from part of a document.
//!
//! ```
//! use param_guard::{Loader, RuleRegistry};
//! use std::sync::Arc;
//!
//! let loader = Loader::new(Arc::new(RuleRegistry::with_builtins()));
//! let table = loader
//!     .load_str(
//!         r#"{
//!             "enforcing": true,
//!             "chains": [
//!                 {
//!                     "param_name_pattern": "^q$",
//!                     "path_pattern": "^/search",
//!                     "rules": [{ "rule": "trim" }]
//!                 }
//!             ]
//!         }"#,
//!     )
//!     .unwrap();
//!
//! assert!(table.is_enforcing());
//! assert_eq!(table.chains().len(), 1);
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::descriptor::RuleDescriptor;
use crate::error::{ConfigError, PatternField};
use crate::pattern::Selector;
use crate::registry::RuleRegistry;
use crate::settings::RuleSettings;
use crate::table::ChainTable;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainTableConfig {
    /// Reject requests on validation failure instead of only logging
    pub enforcing: bool,
    /// Chains in execution order
    pub chains: Vec<ChainConfig>,
}

/// One chain record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Regex searched in the parameter name
    pub param_name_pattern: String,
    /// Select names the pattern does not find
    #[serde(default)]
    pub param_name_negated: bool,
    /// Regex searched in the request path
    pub path_pattern: String,
    /// Select paths the pattern does not find
    #[serde(default)]
    pub path_negated: bool,
    /// Rules in execution order
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// One rule record inside a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Registry identifier
    pub rule: String,
    /// Settings passed to the rule on construction
    #[serde(default, skip_serializing_if = "RuleSettings::is_empty")]
    pub settings: RuleSettings,
}

impl RuleConfig {
    /// Creates a rule record without settings.
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            settings: RuleSettings::new(),
        }
    }
}

/// A document format for chain tables.
///
/// The loader is handed a format instead of reaching for a global
/// serializer, so hosts can plug in their own.
pub trait ConfigFormat: Send + Sync {
    /// Short format name used in error messages.
    fn name(&self) -> &'static str;

    /// Parses a document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the document is malformed.
    fn parse(&self, text: &str) -> Result<ChainTableConfig, ConfigError>;

    /// Writes a document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Render` if the configuration cannot be written.
    fn render(&self, config: &ChainTableConfig) -> Result<String, ConfigError>;
}

/// JSON documents via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl ConfigFormat for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, text: &str) -> Result<ChainTableConfig, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            format: self.name(),
            reason: e.to_string(),
        })
    }

    fn render(&self, config: &ChainTableConfig) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(config).map_err(|e| ConfigError::Render {
            format: self.name(),
            reason: e.to_string(),
        })
    }
}

/// Builds [`ChainTable`]s from configuration documents.
pub struct Loader {
    registry: Arc<RuleRegistry>,
    format: Box<dyn ConfigFormat>,
    preload: bool,
}

impl Loader {
    /// Creates a JSON loader resolving rules from `registry`.
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self {
            registry,
            format: Box::new(JsonFormat),
            preload: false,
        }
    }

    /// Replaces the document format.
    pub fn with_format(mut self, format: impl ConfigFormat + 'static) -> Self {
        self.format = Box::new(format);
        self
    }

    /// Resolves every rule while loading when set, turning settings problems
    /// into load errors instead of first-use failures.
    pub fn preload_rules(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    /// Parses and builds a table from `text`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the document is malformed or describes an
    /// invalid table.
    pub fn load_str(&self, text: &str) -> Result<ChainTable, ConfigError> {
        let config = self.format.parse(text)?;
        self.build(&config)
    }

    /// Reads, parses and builds a table from the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`load_str`](Loader::load_str).
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<ChainTable, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = self.load_str(&text)?;
        tracing::info!(
            path = %path.display(),
            chains = table.chains().len(),
            enforcing = table.is_enforcing(),
            "chain table loaded"
        );
        Ok(table)
    }

    /// Builds a table from parsed records.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` for a pattern that does not
    /// compile, `ConfigError::UnknownRule` for an unregistered identifier and,
    /// when preloading, `ConfigError::Preload` for a rule that cannot be
    /// configured.
    pub fn build(&self, config: &ChainTableConfig) -> Result<ChainTable, ConfigError> {
        let mut table =
            ChainTable::new(Arc::clone(&self.registry)).with_enforcing(config.enforcing);

        for (index, record) in config.chains.iter().enumerate() {
            table = table.with_chain(self.build_chain(index, record)?);
        }

        if self.preload {
            table.preload()?;
        }

        tracing::debug!(
            chains = table.chains().len(),
            enforcing = table.is_enforcing(),
            preload = self.preload,
            "chain table built"
        );
        Ok(table)
    }

    /// Writes `config` in the loader's format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Render` if serialization fails.
    pub fn render(&self, config: &ChainTableConfig) -> Result<String, ConfigError> {
        self.format.render(config)
    }

    fn build_chain(&self, index: usize, record: &ChainConfig) -> Result<Chain, ConfigError> {
        let param_name = selector(
            index,
            PatternField::ParamName,
            &record.param_name_pattern,
            record.param_name_negated,
        )?;
        let path = selector(
            index,
            PatternField::Path,
            &record.path_pattern,
            record.path_negated,
        )?;

        let mut chain = Chain::new(param_name, path);
        for (position, rule) in record.rules.iter().enumerate() {
            if !self.registry.contains(&rule.rule) {
                return Err(ConfigError::UnknownRule {
                    chain: index,
                    position,
                    identifier: rule.rule.clone(),
                });
            }
            chain.push_rule(RuleDescriptor::new(rule.rule.clone(), rule.settings.clone()));
        }
        Ok(chain)
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("registry", &self.registry)
            .field("format", &self.format.name())
            .field("preload", &self.preload)
            .finish()
    }
}

fn selector(
    chain: usize,
    field: PatternField,
    pattern: &str,
    negated: bool,
) -> Result<Selector, ConfigError> {
    Selector::new(pattern, negated).map_err(|source| ConfigError::InvalidPattern {
        chain,
        field,
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> Loader {
        Loader::new(Arc::new(RuleRegistry::with_builtins()))
    }

    #[test]
    fn flags_default_to_off() {
        let table = loader()
            .load_str(r#"{"chains":[{"param_name_pattern":"q","path_pattern":""}]}"#)
            .unwrap();

        assert!(!table.is_enforcing());
        let chain = &table.chains()[0];
        assert!(!chain.param_name().is_negated());
        assert!(!chain.path().is_negated());
        assert!(chain.rules().is_empty());
    }

    #[test]
    fn empty_document_is_an_empty_table() {
        let table = loader().load_str("{}").unwrap();
        assert!(table.chains().is_empty());
    }

    #[test]
    fn malformed_document_fails() {
        let err = loader().load_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "json", .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = loader()
            .load_str(r#"{"enforce": true, "chains": []}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn bad_pattern_names_chain_and_field() {
        let err = loader()
            .load_str(
                r#"{"chains":[
                    {"param_name_pattern":"ok","path_pattern":""},
                    {"param_name_pattern":"ok","path_pattern":"([bad"}
                ]}"#,
            )
            .unwrap_err();

        match err {
            ConfigError::InvalidPattern {
                chain,
                field,
                pattern,
                ..
            } => {
                assert_eq!(chain, 1);
                assert_eq!(field, PatternField::Path);
                assert_eq!(pattern, "([bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_rule_fails_at_load() {
        let err = loader()
            .load_str(
                r#"{"chains":[{"param_name_pattern":"","path_pattern":"",
                    "rules":[{"rule":"trim"},{"rule":"no-such-rule"}]}]}"#,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::UnknownRule { chain: 0, position: 1, ref identifier } if identifier == "no-such-rule"
        ));
    }

    #[test]
    fn settings_problems_are_deferred_unless_preloading() {
        let doc = r#"{"chains":[{"param_name_pattern":"","path_pattern":"",
            "rules":[{"rule":"remove-regex-matches"}]}]}"#;

        let table = loader().load_str(doc).unwrap();
        assert!(!table.chains()[0].rules()[0].is_resolved());

        let err = loader().preload_rules(true).load_str(doc).unwrap_err();
        assert!(matches!(err, ConfigError::Preload { chain: 0, position: 0, .. }));
    }

    #[test]
    fn preloading_resolves_every_rule() {
        let table = loader()
            .preload_rules(true)
            .load_str(
                r#"{"chains":[{"param_name_pattern":"","path_pattern":"",
                    "rules":[{"rule":"trim"},{"rule":"remove-regex-matches","settings":{"pattern":"<!--.*?-->"}}]}]}"#,
            )
            .unwrap();

        assert!(table.chains()[0].rules().iter().all(RuleDescriptor::is_resolved));
    }

    #[test]
    fn render_then_load_keeps_the_table() {
        let config = ChainTableConfig {
            enforcing: true,
            chains: vec![ChainConfig {
                param_name_pattern: "^admin.*".to_string(),
                param_name_negated: true,
                path_pattern: String::new(),
                path_negated: false,
                rules: vec![
                    RuleConfig::new("trim"),
                    RuleConfig {
                        rule: "sanitize-html".to_string(),
                        settings: RuleSettings::new().with("allowLinks", "true"),
                    },
                ],
            }],
        };

        let loader = loader();
        let text = loader.render(&config).unwrap();
        assert!(!text.contains("\"settings\": {}"));

        let parsed = JsonFormat.parse(&text).unwrap();
        assert_eq!(parsed, config);

        let table = loader.load_str(&text).unwrap();
        assert!(table.is_enforcing());
        assert!(table.chains()[0].param_name().is_negated());
        assert_eq!(table.chains()[0].rules()[1].settings().get("allowLinks"), Some("true"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = loader()
            .load_path("/definitely/not/here/chains.json")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn custom_format_is_used() {
        struct Fixed;

        impl ConfigFormat for Fixed {
            fn name(&self) -> &'static str {
                "fixed"
            }

            fn parse(&self, _text: &str) -> Result<ChainTableConfig, ConfigError> {
                Ok(ChainTableConfig {
                    enforcing: true,
                    chains: Vec::new(),
                })
            }

            fn render(&self, _config: &ChainTableConfig) -> Result<String, ConfigError> {
                Ok("fixed".to_string())
            }
        }

        let loader = loader().with_format(Fixed);
        assert!(loader.load_str("ignored").unwrap().is_enforcing());
        assert_eq!(loader.render(&ChainTableConfig::default()).unwrap(), "fixed");
        assert!(format!("{loader:?}").contains("fixed"));
    }
}
