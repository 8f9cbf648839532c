use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ResolutionError;
use crate::rule::Rule;
use crate::settings::RuleSettings;

/// Constructs an unconfigured rule.
pub type RuleFactory = Arc<dyn Fn() -> Box<dyn Rule> + Send + Sync>;

/// Maps rule identifiers to factories.
///
/// The registry is populated at startup and handed to the configuration
/// loader. Identifiers that are not registered are reported as configuration
/// errors instead of failing inside a request.
///
/// # Examples
///
/// ```
/// use param_guard::{RuleRegistry, RuleSettings};
///
/// let registry = RuleRegistry::with_builtins();
/// assert!(registry.contains("trim"));
///
/// let rule = registry.create("trim", &RuleSettings::new()).expect("trim is built in");
/// # let _ = rule;
/// ```
#[derive(Clone, Default)]
pub struct RuleRegistry {
    factories: HashMap<String, RuleFactory>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in rule.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::rules::register_builtins(&mut registry);
        registry
    }

    /// Registers a factory under `identifier`, replacing any previous one.
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Rule> + Send + Sync + 'static,
    {
        self.factories.insert(identifier.into(), Arc::new(factory));
        self
    }

    /// Registers a rule type constructed through `Default`.
    pub fn register_default<R>(&mut self, identifier: impl Into<String>) -> &mut Self
    where
        R: Rule + Default + 'static,
    {
        self.register(identifier, || Box::new(R::default()) as Box<dyn Rule>)
    }

    /// Returns true if a factory is registered under `identifier`.
    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Returns the registered identifiers in sorted order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Constructs and configures the rule registered under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::Unknown` if nothing is registered under the
    /// identifier and `ResolutionError::Configure` if the rule rejects its
    /// settings.
    pub fn create(
        &self,
        identifier: &str,
        settings: &RuleSettings,
    ) -> Result<Arc<dyn Rule>, ResolutionError> {
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| ResolutionError::Unknown(identifier.to_string()))?;

        let mut rule = factory();
        rule.configure(settings)
            .map_err(|source| ResolutionError::Configure {
                rule: identifier.to_string(),
                source,
            })?;

        Ok(Arc::from(rule))
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}
