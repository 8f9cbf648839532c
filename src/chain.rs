use crate::descriptor::RuleDescriptor;
use crate::pattern::Selector;

/// An ordered list of rules applied to matching parameters.
///
/// A chain applies to a parameter when its name selector picks the parameter
/// name and its path selector picks the request path. Each selector carries
/// its own negation flag.
///
/// # Examples
///
/// ```
/// use param_guard::{Chain, RuleDescriptor, RuleSettings, Selector};
///
/// let chain = Chain::new(
///     Selector::new("^q$", false).unwrap(),
///     Selector::new("^/search", false).unwrap(),
/// )
/// .with_rule(RuleDescriptor::new("trim", RuleSettings::new()));
///
/// assert!(chain.matches("q", "/search/results"));
/// assert!(!chain.matches("q", "/admin"));
/// ```
#[derive(Debug)]
pub struct Chain {
    param_name: Selector,
    path: Selector,
    rules: Vec<RuleDescriptor>,
}

impl Chain {
    /// Creates a chain with no rules.
    pub fn new(param_name: Selector, path: Selector) -> Self {
        Self {
            param_name,
            path,
            rules: Vec::new(),
        }
    }

    /// Appends a rule, returning the chain for chaining.
    pub fn with_rule(mut self, rule: RuleDescriptor) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends a rule.
    pub fn push_rule(&mut self, rule: RuleDescriptor) {
        self.rules.push(rule);
    }

    /// Returns the parameter-name selector.
    pub fn param_name(&self) -> &Selector {
        &self.param_name
    }

    /// Returns the path selector.
    pub fn path(&self) -> &Selector {
        &self.path
    }

    /// Returns the rules in execution order.
    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    /// Decides whether this chain applies to `param_name` sent to `path`.
    ///
    /// Never fails: patterns were compiled when the chain was built.
    pub fn matches(&self, param_name: &str, path: &str) -> bool {
        self.param_name.selects(param_name) && self.path.selects(path)
    }
}
