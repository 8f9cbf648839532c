use std::collections::HashMap;

use crate::request::ParamSource;
use crate::rule::ParamValue;

/// Rewritten parameter values for one request.
///
/// Only parameters whose values actually changed are stored. Everything else
/// is read from the original request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamOverlay {
    entries: HashMap<String, Vec<ParamValue>>,
}

impl ParamOverlay {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records rewritten values for `name`, replacing earlier ones.
    pub fn set(&mut self, name: impl Into<String>, values: Vec<ParamValue>) {
        self.entries.insert(name.into(), values);
    }

    /// Returns the rewritten values for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&[ParamValue]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Returns true if `name` was rewritten.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of rewritten parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was rewritten.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A request as seen after filtering.
///
/// Reads consult the overlay first and fall back to the original request, so
/// untouched parameters come back exactly as submitted. Parameter names and
/// the path always come from the original request.
///
/// # Examples
///
/// ```
/// use param_guard::web::RequestAdapter;
/// use param_guard::{FilteredRequest, ParamOverlay, ParamSource};
///
/// let mut adapter = RequestAdapter::new("req-1", "/search");
/// adapter.add_param("q", " rust ");
/// adapter.add_param("page", "2");
///
/// let mut overlay = ParamOverlay::new();
/// overlay.set("q", vec![Some("rust".to_string())]);
///
/// let filtered = FilteredRequest::new(&adapter, overlay);
/// assert_eq!(filtered.param("q"), Some("rust"));
/// assert_eq!(filtered.param("page"), Some("2"));
/// ```
#[derive(Debug)]
pub struct FilteredRequest<'a, S: ?Sized> {
    source: &'a S,
    overlay: ParamOverlay,
}

impl<'a, S: ParamSource + ?Sized> FilteredRequest<'a, S> {
    /// Layers `overlay` over `source`.
    pub fn new(source: &'a S, overlay: ParamOverlay) -> Self {
        Self { source, overlay }
    }

    /// Returns the underlying, unmodified request.
    pub fn original(&self) -> &'a S {
        self.source
    }

    /// Returns the rewritten values.
    pub fn overlay(&self) -> &ParamOverlay {
        &self.overlay
    }

    /// Returns true if `name` was rewritten by a rule.
    pub fn is_rewritten(&self, name: &str) -> bool {
        self.overlay.contains(name)
    }
}

impl<S: ParamSource + ?Sized> ParamSource for FilteredRequest<'_, S> {
    fn path(&self) -> &str {
        self.source.path()
    }

    fn param_names(&self) -> Vec<&str> {
        self.source.param_names()
    }

    fn param_values(&self, name: &str) -> Option<&[ParamValue]> {
        match self.overlay.get(name) {
            Some(values) => Some(values),
            None => self.source.param_values(name),
        }
    }

    fn request_id(&self) -> Option<&str> {
        self.source.request_id()
    }
}
