use std::sync::{Arc, PoisonError, RwLock};

use crate::chain::Chain;
use crate::error::ConfigError;
use crate::registry::RuleRegistry;

/// The engine's configuration: ordered chains plus the enforcing flag.
///
/// A table is built once, then shared read-only by every request. Reloading
/// builds a new table and swaps it in through a [`TableHandle`]; an existing
/// table is never mutated while serving traffic.
///
/// # Examples
///
/// ```
/// use param_guard::{Chain, ChainTable, RuleRegistry, Selector};
/// use std::sync::Arc;
///
/// let table = ChainTable::new(Arc::new(RuleRegistry::with_builtins()))
///     .with_chain(Chain::new(
///         Selector::new("^q$", false).unwrap(),
///         Selector::new("", false).unwrap(),
///     ))
///     .with_enforcing(true);
///
/// assert!(table.is_enforcing());
/// assert_eq!(table.matching("q", "/search").count(), 1);
/// assert_eq!(table.matching("page", "/search").count(), 0);
/// ```
#[derive(Debug)]
pub struct ChainTable {
    chains: Vec<Chain>,
    enforcing: bool,
    registry: Arc<RuleRegistry>,
}

impl ChainTable {
    /// Creates an empty, monitoring-mode table resolving rules from `registry`.
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self {
            chains: Vec::new(),
            enforcing: false,
            registry,
        }
    }

    /// Appends a chain, returning the table for chaining.
    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chains.push(chain);
        self
    }

    /// Sets the enforcing flag, returning the table for chaining.
    pub fn with_enforcing(mut self, enforcing: bool) -> Self {
        self.enforcing = enforcing;
        self
    }

    /// Returns true if validation failures reject the request.
    pub fn is_enforcing(&self) -> bool {
        self.enforcing
    }

    /// Returns the chains in table order.
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Returns the registry used to resolve rule identifiers.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Yields `(index, chain)` for every chain that applies to `param_name`
    /// sent to `path`, in table order.
    pub fn matching<'a>(
        &'a self,
        param_name: &'a str,
        path: &'a str,
    ) -> impl Iterator<Item = (usize, &'a Chain)> + 'a {
        self.chains
            .iter()
            .enumerate()
            .filter(move |(_, chain)| chain.matches(param_name, path))
    }

    /// Resolves every rule in the table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Preload` for the first rule that cannot be
    /// constructed or configured.
    pub fn preload(&self) -> Result<(), ConfigError> {
        for (chain_index, chain) in self.chains.iter().enumerate() {
            for (position, descriptor) in chain.rules().iter().enumerate() {
                descriptor
                    .resolve(&self.registry)
                    .map_err(|source| ConfigError::Preload {
                        chain: chain_index,
                        position,
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

/// Publishes the current chain table and swaps it atomically on reload.
///
/// Requests take a snapshot with [`current`](TableHandle::current) and keep
/// using it to completion, so a reload never changes the rules halfway
/// through a request.
#[derive(Debug)]
pub struct TableHandle {
    current: RwLock<Arc<ChainTable>>,
}

impl TableHandle {
    /// Creates a handle publishing `table`.
    pub fn new(table: ChainTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// Returns the table currently in force.
    pub fn current(&self) -> Arc<ChainTable> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replaces the table, returning the previous one.
    pub fn replace(&self, table: ChainTable) -> Arc<ChainTable> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, Arc::new(table));
        tracing::info!(
            chains = guard.chains().len(),
            enforcing = guard.is_enforcing(),
            "chain table replaced"
        );
        previous
    }
}
