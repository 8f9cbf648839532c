//! Rule execution for a single parameter.
//!
//! [`apply`] runs every chain that selects a parameter, in table order, and
//! every rule of those chains, in chain order. Each rule sees the values left
//! by the rule before it. What happens on a validation failure depends on the
//! table's enforcing flag:
//!
//! - enforcing: the whole request is rejected
//! - monitoring: the failure is logged and recorded, the rule's effect is
//!   dropped and execution continues with the next rule
//!
//! Resolution failures and contract violations are fatal in both modes.

use crate::error::{ContractViolation, EngineError, Rejection};
use crate::logging::RequestLog;
use crate::rule::{ParamValue, Target};
use crate::snapshot::ParameterSnapshot;
use crate::table::ChainTable;

/// Outcome of running the chain table over one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The parameter may proceed.
    Accepted {
        /// Final values, read through to the original when nothing changed
        values: Vec<ParamValue>,
        /// True if `values` differ from the submitted values
        changed: bool,
        /// Failures tolerated in monitoring mode, in execution order
        violations: Vec<Rejection>,
    },
    /// An enforcing table rejected the parameter.
    Rejected(Rejection),
}

impl Verdict {
    /// Returns true for [`Verdict::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }

    /// Returns the accepted values, or `None` if the parameter was rejected.
    pub fn values(&self) -> Option<&[ParamValue]> {
        match self {
            Verdict::Accepted { values, .. } => Some(values),
            Verdict::Rejected(_) => None,
        }
    }

    /// Returns the rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Accepted { .. } => None,
            Verdict::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Runs every applicable chain over the values of `param_name`.
///
/// Equivalent to [`apply_logged`] with a log that has no request id.
///
/// # Errors
///
/// See [`apply_logged`].
///
/// # Examples
///
/// ```
/// use param_guard::{apply, Chain, ChainTable, RuleDescriptor, RuleRegistry, RuleSettings, Selector};
/// use std::sync::Arc;
///
/// let table = ChainTable::new(Arc::new(RuleRegistry::with_builtins())).with_chain(
///     Chain::new(Selector::new("^q$", false).unwrap(), Selector::new("", false).unwrap())
///         .with_rule(RuleDescriptor::new("trim", RuleSettings::new())),
/// );
///
/// let verdict = apply(&table, "q", "/search", vec![Some("  rust ".to_string())]).unwrap();
/// assert_eq!(verdict.values(), Some(&[Some("rust".to_string())][..]));
/// ```
pub fn apply(
    table: &ChainTable,
    param_name: &str,
    path: &str,
    values: Vec<ParamValue>,
) -> Result<Verdict, EngineError> {
    apply_logged(table, RequestLog::default(), param_name, path, values)
}

/// Runs every applicable chain over the values of `param_name`, logging
/// through `log`.
///
/// A parameter with no values is returned untouched without invoking any
/// rule.
///
/// # Errors
///
/// Returns `EngineError::Resolution` if a rule cannot be constructed or
/// configured, and `EngineError::Contract` if a rule returns a different
/// number of values than it was given. Both abort the request in either
/// mode.
pub fn apply_logged(
    table: &ChainTable,
    log: RequestLog<'_>,
    param_name: &str,
    path: &str,
    values: Vec<ParamValue>,
) -> Result<Verdict, EngineError> {
    let mut snapshot = ParameterSnapshot::new(values);
    let mut violations = Vec::new();

    if snapshot.original().is_empty() {
        return Ok(accepted(snapshot, violations));
    }

    let target = Target::new(param_name, path);
    let mut applied = 0;

    for (index, chain) in table.matching(param_name, path) {
        applied += 1;

        for descriptor in chain.rules() {
            let identifier = descriptor.identifier();
            let rule = descriptor.resolve(table.registry()).map_err(|err| {
                log.error(format_args!(
                    "chain {}: rule `{}` could not be resolved: {}",
                    index, identifier, err
                ));
                EngineError::from(err)
            })?;

            let input = snapshot.current();
            let expected = input.len();

            match rule.fix_values(target, input) {
                Ok(output) => {
                    if output.len() != expected {
                        let violation = ContractViolation {
                            rule: identifier.to_string(),
                            expected,
                            actual: output.len(),
                        };
                        log.error(format_args!("chain {}: {}", index, violation));
                        return Err(violation.into());
                    }
                    if snapshot.commit(output) {
                        log.info(format_args!(
                            "parameter `{}` on `{}` modified by `{}` (chain {})",
                            param_name, path, identifier, index
                        ));
                    } else {
                        log.debug(format_args!(
                            "parameter `{}` passed `{}` unchanged (chain {})",
                            param_name, identifier, index
                        ));
                    }
                }
                Err(failure) => {
                    let rejection = Rejection {
                        rule: identifier.to_string(),
                        param: param_name.to_string(),
                        path: path.to_string(),
                        failure,
                    };
                    if table.is_enforcing() {
                        log.warn(format_args!("request rejected: {}", rejection));
                        return Ok(Verdict::Rejected(rejection));
                    }
                    // current values are left as they were before this rule
                    log.warn(format_args!(
                        "monitoring mode, continuing: {}",
                        rejection
                    ));
                    violations.push(rejection);
                }
            }
        }
    }

    if applied == 0 {
        log.debug(format_args!(
            "parameter `{}` on `{}` not validated by any chain",
            param_name, path
        ));
    }

    Ok(accepted(snapshot, violations))
}

fn accepted(snapshot: ParameterSnapshot, violations: Vec<Rejection>) -> Verdict {
    let changed = snapshot.is_changed();
    Verdict::Accepted {
        values: snapshot.into_values(),
        changed,
        violations,
    }
}
