//! Request filtering at the web boundary.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework-specific code builds RequestAdapter
//!   ↓
//! filter_request(table, &adapter)
//!   ↓
//! Pass(FilteredRequest)  → handler reads parameters through it
//! Reject(Rejection)      → respond 400 "Invalid parameter data"
//! Err(EngineError)       → respond 400 "Invalid parameter data", alert operators
//! ```

use std::sync::Arc;

use crate::engine::{apply_logged, Verdict};
use crate::error::{EngineError, Rejection, GENERIC_REJECTION};
use crate::logging::RequestLog;
use crate::overlay::{FilteredRequest, ParamOverlay};
use crate::request::ParamSource;
use crate::table::{ChainTable, TableHandle};

/// HTTP status hosts should answer with when a request is rejected or the
/// filter fails.
pub const REJECT_STATUS: u16 = 400;

/// Result of filtering a whole request.
#[derive(Debug)]
pub enum FilterOutcome<'a, S: ?Sized> {
    /// Every parameter was accepted; read them through the filtered request.
    Pass(FilteredRequest<'a, S>),
    /// A parameter was rejected by an enforcing table.
    Reject(Rejection),
}

impl<'a, S: ParamSource + ?Sized> FilterOutcome<'a, S> {
    /// Returns true for [`FilterOutcome::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, FilterOutcome::Pass(_))
    }

    /// Returns the filtered request if the request passed.
    pub fn into_filtered(self) -> Option<FilteredRequest<'a, S>> {
        match self {
            FilterOutcome::Pass(filtered) => Some(filtered),
            FilterOutcome::Reject(_) => None,
        }
    }

    /// Returns the rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            FilterOutcome::Pass(_) => None,
            FilterOutcome::Reject(rejection) => Some(rejection),
        }
    }

    /// Returns the text to show the client on rejection.
    pub fn public_message(&self) -> Option<&'static str> {
        self.rejection().map(|_| GENERIC_REJECTION)
    }
}

/// Runs the chain table over every parameter of `source`.
///
/// Parameter names are taken from the original request, in order, and each
/// parameter is filtered independently. Rewritten values are collected in an
/// overlay; the source itself is never modified.
///
/// # Errors
///
/// Returns `EngineError` if a rule cannot be resolved or breaks its
/// contract. The caller should answer with [`REJECT_STATUS`] and
/// [`EngineError::public_message`].
///
/// # Examples
///
/// ```
/// use param_guard::web::{filter_request, FilterOutcome, RequestAdapter};
/// use param_guard::{Loader, ParamSource, RuleRegistry};
/// use std::sync::Arc;
///
/// let table = Loader::new(Arc::new(RuleRegistry::with_builtins()))
///     .load_str(r#"{"chains":[{"param_name_pattern":"","path_pattern":"","rules":[{"rule":"trim"}]}]}"#)
///     .unwrap();
///
/// let adapter = RequestAdapter::new("req-1", "/search").with_params([("q", "  rust  ")]);
///
/// match filter_request(&table, &adapter).unwrap() {
///     FilterOutcome::Pass(filtered) => assert_eq!(filtered.param("q"), Some("rust")),
///     FilterOutcome::Reject(rejection) => panic!("unexpected rejection: {rejection}"),
/// }
/// ```
pub fn filter_request<'a, S>(
    table: &ChainTable,
    source: &'a S,
) -> Result<FilterOutcome<'a, S>, EngineError>
where
    S: ParamSource + ?Sized,
{
    let log = RequestLog::new(source.request_id());
    let path = source.path();
    let mut overlay = ParamOverlay::new();

    for name in source.param_names() {
        let values = source
            .param_values(name)
            .map(<[_]>::to_vec)
            .unwrap_or_default();

        match apply_logged(table, log, name, path, values)? {
            Verdict::Accepted {
                values, changed, ..
            } => {
                if changed {
                    overlay.set(name, values);
                }
            }
            Verdict::Rejected(rejection) => return Ok(FilterOutcome::Reject(rejection)),
        }
    }

    log.debug(format_args!(
        "request on `{}` passed, {} parameter(s) rewritten",
        path,
        overlay.len()
    ));
    Ok(FilterOutcome::Pass(FilteredRequest::new(source, overlay)))
}

/// A reloadable request filter.
///
/// Each call to [`filter`](ParamFilter::filter) takes the table current at
/// that moment and uses it for the whole request, so a concurrent
/// [`reload`](ParamFilter::reload) never mixes two tables in one request.
#[derive(Debug, Clone)]
pub struct ParamFilter {
    tables: Arc<TableHandle>,
}

impl ParamFilter {
    /// Creates a filter serving `table`.
    pub fn new(table: ChainTable) -> Self {
        Self {
            tables: Arc::new(TableHandle::new(table)),
        }
    }

    /// Creates a filter reading from a shared handle.
    pub fn from_handle(tables: Arc<TableHandle>) -> Self {
        Self { tables }
    }

    /// Returns the table currently in force.
    pub fn table(&self) -> Arc<ChainTable> {
        self.tables.current()
    }

    /// Replaces the table for subsequent requests.
    pub fn reload(&self, table: ChainTable) {
        self.tables.replace(table);
    }

    /// Filters `source` with the current table.
    ///
    /// # Errors
    ///
    /// See [`filter_request`].
    pub fn filter<'a, S>(&self, source: &'a S) -> Result<FilterOutcome<'a, S>, EngineError>
    where
        S: ParamSource + ?Sized,
    {
        let table = self.tables.current();
        filter_request(&table, source)
    }
}
