//! Extraction boundary trait for web integration.

use super::RequestAdapter;

/// Builds a [`RequestAdapter`] from a framework-specific request.
///
/// This trait only maps framework types to the adapter. It does not
/// validate anything; filtering happens afterwards through
/// [`filter_request`](super::filter_request).
///
/// Implementations should report every parameter name and every value,
/// including repeated names, in the order the framework exposes them.
///
/// # Examples
///
/// ```
/// use param_guard::web::{ExtractParams, RequestAdapter};
/// use param_guard::ParamSource;
///
/// struct MyFrameworkRequest {
///     id: String,
///     uri: String,
///     form: Vec<(String, String)>,
/// }
///
/// impl ExtractParams for MyFrameworkRequest {
///     fn extract_params(&self) -> RequestAdapter {
///         RequestAdapter::new(self.id.clone(), self.uri.clone())
///             .with_params(self.form.iter().cloned())
///     }
/// }
///
/// let request = MyFrameworkRequest {
///     id: "req-1".to_string(),
///     uri: "/login".to_string(),
///     form: vec![("user".to_string(), "alice".to_string())],
/// };
/// assert_eq!(request.extract_params().param("user"), Some("alice"));
/// ```
pub trait ExtractParams {
    /// Collects the request id, path and parameters.
    fn extract_params(&self) -> RequestAdapter;
}

impl ExtractParams for RequestAdapter {
    fn extract_params(&self) -> RequestAdapter {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ParamSource;

    struct TestRequest {
        id: String,
        query: Vec<(&'static str, &'static str)>,
    }

    impl ExtractParams for TestRequest {
        fn extract_params(&self) -> RequestAdapter {
            RequestAdapter::new(self.id.clone(), "/test").with_params(self.query.iter().copied())
        }
    }

    #[test]
    fn extract_params_trait_works() {
        let req = TestRequest {
            id: "test-1".to_string(),
            query: vec![("a", "1"), ("a", "2")],
        };

        let adapter = req.extract_params();
        assert_eq!(adapter.id(), "test-1");
        assert_eq!(adapter.param_values("a").map(<[_]>::len), Some(2));
    }

    #[test]
    fn adapter_extracts_itself() {
        let adapter = RequestAdapter::new("r", "/").with_params([("k", "v")]);
        assert_eq!(adapter.extract_params(), adapter);
    }
}
