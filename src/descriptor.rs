use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::ResolutionError;
use crate::registry::RuleRegistry;
use crate::rule::Rule;
use crate::settings::RuleSettings;

/// A configured rule reference inside a chain.
///
/// The rule itself is built lazily on first use and memoized. Construction is
/// guarded, so concurrent first calls observe one and the same instance. A
/// failed construction is not cached and will be retried by the next caller.
///
/// # Examples
///
/// ```
/// use param_guard::{RuleDescriptor, RuleRegistry, RuleSettings};
/// use std::sync::Arc;
///
/// let registry = RuleRegistry::with_builtins();
/// let descriptor = RuleDescriptor::new("trim", RuleSettings::new());
///
/// let first = descriptor.resolve(&registry).unwrap();
/// let second = descriptor.resolve(&registry).unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct RuleDescriptor {
    identifier: String,
    settings: RuleSettings,
    instance: OnceCell<Arc<dyn Rule>>,
}

impl RuleDescriptor {
    /// Creates a descriptor for `identifier` with `settings`.
    pub fn new(identifier: impl Into<String>, settings: RuleSettings) -> Self {
        Self {
            identifier: identifier.into(),
            settings,
            instance: OnceCell::new(),
        }
    }

    /// Creates a descriptor around an already configured rule.
    ///
    /// Resolution returns `rule` without consulting the registry.
    pub fn from_rule(identifier: impl Into<String>, rule: Arc<dyn Rule>) -> Self {
        Self {
            identifier: identifier.into(),
            settings: RuleSettings::new(),
            instance: OnceCell::with_value(rule),
        }
    }

    /// Returns the rule identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the settings passed to the rule on construction.
    pub fn settings(&self) -> &RuleSettings {
        &self.settings
    }

    /// Returns true once the rule has been constructed.
    pub fn is_resolved(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Returns the memoized rule, constructing and configuring it on first use.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError` if the identifier is unknown or the rule
    /// rejects its settings.
    pub fn resolve(&self, registry: &RuleRegistry) -> Result<Arc<dyn Rule>, ResolutionError> {
        self.instance
            .get_or_try_init(|| {
                tracing::debug!(rule = %self.identifier, "constructing rule");
                registry.create(&self.identifier, &self.settings)
            })
            .map(Arc::clone)
    }
}

impl fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("identifier", &self.identifier)
            .field("settings", &self.settings)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
