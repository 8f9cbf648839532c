use crate::error::{ContractViolation, Error, SettingsError, ValidationFailure};
use crate::settings::RuleSettings;

/// A single submitted parameter value. `None` marks a value the host
/// reported as absent.
pub type ParamValue = Option<String>;

/// The parameter a rule is being applied to.
///
/// Rules receive it so failure messages and logs can name the parameter and
/// the path; most transforms ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    /// Parameter name
    pub param: &'a str,
    /// Request path the parameter was sent to
    pub path: &'a str,
}

impl<'a> Target<'a> {
    /// Creates a target for the given parameter and path.
    pub fn new(param: &'a str, path: &'a str) -> Self {
        Self { param, path }
    }
}

/// A configurable batch transform over a parameter's values.
///
/// `Rule` is the plugin boundary of the engine. A rule is created by a
/// factory, configured once through [`configure`](Rule::configure), and then
/// shared read-only across requests behind an `Arc`.
///
/// # Invariants
///
/// Implementations MUST:
/// - Return exactly as many values as they were given
/// - Be pure: no side effects beyond the returned values
/// - Return `Err(ValidationFailure)` for values they cannot fix
/// - Not echo the rejected input in failure messages
///
/// # Examples
///
/// ```
/// use param_guard::{ParamValue, Rule, Target, ValidationFailure};
///
/// struct Lowercase;
///
/// impl Rule for Lowercase {
///     fn fix_values(
///         &self,
///         _target: Target<'_>,
///         values: &[ParamValue],
///     ) -> Result<Vec<ParamValue>, ValidationFailure> {
///         Ok(param_guard::map_present(values, |v| v.to_lowercase()))
///     }
/// }
///
/// let rule = Lowercase;
/// let fixed = rule
///     .fix_value(Target::new("q", "/search"), Some("MiXeD".to_string()))
///     .unwrap();
/// assert_eq!(fixed.as_deref(), Some("mixed"));
/// ```
pub trait Rule: Send + Sync {
    /// Applies settings to a freshly constructed rule.
    ///
    /// The default accepts and ignores any settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a required setting is missing or invalid.
    fn configure(&mut self, settings: &RuleSettings) -> Result<(), SettingsError> {
        let _ = settings;
        Ok(())
    }

    /// Fixes a batch of values, returning one output per input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure` if a value is invalid and cannot be fixed.
    fn fix_values(
        &self,
        target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure>;

    /// Fixes a single value. Equivalent to a one-element batch call.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the rule rejects the value and
    /// `Error::Contract` if the batch call did not return exactly one value.
    fn fix_value(&self, target: Target<'_>, value: ParamValue) -> Result<ParamValue, Error> {
        let mut fixed = self.fix_values(target, std::slice::from_ref(&value))?;
        let actual = fixed.len();
        match fixed.pop() {
            Some(value) if actual == 1 => Ok(value),
            _ => Err(ContractViolation {
                rule: std::any::type_name::<Self>().to_string(),
                expected: 1,
                actual,
            }
            .into()),
        }
    }
}

/// Maps every present value through `f`, keeping absent values absent.
pub fn map_present<F>(values: &[ParamValue], mut f: F) -> Vec<ParamValue>
where
    F: FnMut(&str) -> String,
{
    values
        .iter()
        .map(|value| value.as_deref().map(&mut f))
        .collect()
}

/// Checks every present value with `check`, returning the values unchanged
/// when all of them pass.
///
/// # Errors
///
/// Returns the first failure reported by `check`.
pub fn check_present<F>(values: &[ParamValue], mut check: F) -> Result<Vec<ParamValue>, ValidationFailure>
where
    F: FnMut(&str) -> Result<(), ValidationFailure>,
{
    for value in values.iter().flatten() {
        check(value)?;
    }
    Ok(values.to_vec())
}

/// A rule that accepts every value unchanged.
///
/// Useful as a placeholder in a chain that is being rolled out, or to make a
/// parameter show up in debug logs without touching it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Rule for PassThrough {
    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        Ok(values.to_vec())
    }
}

/// A rule that rejects every value.
///
/// Pair it with a chain selecting parameters that must never be sent, for
/// example debugging switches on production paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl Rule for RejectAll {
    fn fix_values(
        &self,
        _target: Target<'_>,
        _values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        Err(ValidationFailure::new("parameter is not allowed"))
    }
}
