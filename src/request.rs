use crate::rule::ParamValue;

/// Read access to the parameters of an inbound request.
///
/// This is the boundary between the host framework and the engine. The
/// engine only reads through it; rewritten values are exposed through a
/// [`FilteredRequest`](crate::FilteredRequest) layered on top.
///
/// # Examples
///
/// ```
/// use param_guard::{ParamSource, ParamValue};
///
/// struct Single {
///     values: Vec<ParamValue>,
/// }
///
/// impl ParamSource for Single {
///     fn path(&self) -> &str {
///         "/search"
///     }
///
///     fn param_names(&self) -> Vec<&str> {
///         vec!["q"]
///     }
///
///     fn param_values(&self, name: &str) -> Option<&[ParamValue]> {
///         (name == "q").then_some(self.values.as_slice())
///     }
/// }
///
/// let request = Single { values: vec![Some("rust".to_string())] };
/// assert_eq!(request.param("q"), Some("rust"));
/// assert_eq!(request.param("page"), None);
/// ```
pub trait ParamSource {
    /// Returns the target path of the request.
    fn path(&self) -> &str;

    /// Returns the names of the parameters present, in submission order.
    fn param_names(&self) -> Vec<&str>;

    /// Returns every value submitted under `name`.
    fn param_values(&self, name: &str) -> Option<&[ParamValue]>;

    /// Returns the first value submitted under `name`.
    fn param(&self, name: &str) -> Option<&str> {
        self.param_values(name)?.first()?.as_deref()
    }

    /// Returns an identifier used to correlate log events, if the host has one.
    fn request_id(&self) -> Option<&str> {
        None
    }
}
