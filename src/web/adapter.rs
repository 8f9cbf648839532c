//! Framework-agnostic request representation.

use crate::request::ParamSource;
use crate::rule::ParamValue;

/// Owned request data handed to the parameter filter.
///
/// `RequestAdapter` holds simple, owned data so it does not couple to any
/// specific framework's request types. Framework-specific code should
/// implement [`ExtractParams`](super::ExtractParams) or build an adapter by
/// hand.
///
/// Parameter names keep the order in which they were first added. Adding a
/// name again appends another value to it.
///
/// # Examples
///
/// ```
/// use param_guard::web::RequestAdapter;
/// use param_guard::ParamSource;
///
/// let mut adapter = RequestAdapter::new("req-12345", "/search");
/// adapter.add_param("q", "rust");
/// adapter.add_param("tag", "a");
/// adapter.add_param("tag", "b");
///
/// assert_eq!(adapter.param_names(), vec!["q", "tag"]);
/// assert_eq!(adapter.param_values("tag").map(<[_]>::len), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestAdapter {
    /// Request identifier used in logs
    request_id: String,
    /// Target path, without query string
    path: String,
    /// Parameters in first-seen order
    params: Vec<(String, Vec<ParamValue>)>,
}

impl RequestAdapter {
    /// Creates an adapter with no parameters.
    pub fn new(request_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Appends a value for `name`.
    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.push(name.into(), Some(value.into()));
    }

    /// Appends an absent value for `name`.
    ///
    /// Some hosts report a parameter that was named without a value this
    /// way.
    pub fn add_absent(&mut self, name: impl Into<String>) {
        self.push(name.into(), None);
    }

    /// Adds every `(name, value)` pair, returning the adapter for chaining.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            self.add_param(name, value);
        }
        self
    }

    /// Returns the request ID.
    pub fn id(&self) -> &str {
        &self.request_id
    }

    fn push(&mut self, name: String, value: ParamValue) {
        match self.params.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => values.push(value),
            None => self.params.push((name, vec![value])),
        }
    }
}

impl ParamSource for RequestAdapter {
    fn path(&self) -> &str {
        &self.path
    }

    fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn param_values(&self, name: &str) -> Option<&[ParamValue]> {
        self.params
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
    }

    fn request_id(&self) -> Option<&str> {
        Some(&self.request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_adapter_new() {
        let adapter = RequestAdapter::new("req-test", "/a");
        assert_eq!(adapter.id(), "req-test");
        assert_eq!(adapter.request_id(), Some("req-test"));
        assert_eq!(adapter.path(), "/a");
        assert!(adapter.param_names().is_empty());
    }

    #[test]
    fn repeated_names_append_values() {
        let mut adapter = RequestAdapter::new("req-1", "/");
        adapter.add_param("k", "1");
        adapter.add_param("other", "x");
        adapter.add_param("k", "2");

        assert_eq!(adapter.param_names(), vec!["k", "other"]);
        assert_eq!(
            adapter.param_values("k"),
            Some(&[Some("1".to_string()), Some("2".to_string())][..])
        );
        assert_eq!(adapter.param("k"), Some("1"));
    }

    #[test]
    fn absent_values_are_kept() {
        let mut adapter = RequestAdapter::new("req-1", "/");
        adapter.add_absent("flag");
        assert_eq!(adapter.param_values("flag"), Some(&[None][..]));
        assert_eq!(adapter.param("flag"), None);
    }

    #[test]
    fn with_params_builds_in_order() {
        let adapter =
            RequestAdapter::new("req-1", "/").with_params([("b", "1"), ("a", "2"), ("b", "3")]);
        assert_eq!(adapter.param_names(), vec!["b", "a"]);
        assert_eq!(adapter.param_values("b").map(<[_]>::len), Some(2));
        assert_eq!(adapter.param_values("missing"), None);
    }
}
