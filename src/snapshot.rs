use crate::rule::ParamValue;

/// Per-request state of one parameter while its chains run.
///
/// `current` starts as a copy of `original` and is replaced every time a
/// rule changes the values. The original values are never touched, so the
/// snapshot can always tell whether the parameter ended up rewritten.
///
/// # Examples
///
/// ```
/// use param_guard::ParameterSnapshot;
///
/// let mut snapshot = ParameterSnapshot::new(vec![Some(" x ".to_string())]);
/// assert!(!snapshot.is_changed());
///
/// snapshot.commit(vec![Some("x".to_string())]);
/// assert!(snapshot.is_changed());
/// assert_eq!(snapshot.values(), &[Some("x".to_string())]);
/// assert_eq!(snapshot.original(), &[Some(" x ".to_string())]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSnapshot {
    original: Vec<ParamValue>,
    current: Vec<ParamValue>,
}

impl ParameterSnapshot {
    /// Creates a snapshot whose current values equal `original`.
    pub fn new(original: Vec<ParamValue>) -> Self {
        Self {
            current: original.clone(),
            original,
        }
    }

    /// Returns the values as submitted.
    pub fn original(&self) -> &[ParamValue] {
        &self.original
    }

    /// Returns the values as rewritten so far.
    pub fn current(&self) -> &[ParamValue] {
        &self.current
    }

    /// Read-through accessor: the current values if they differ from the
    /// original, otherwise the original values.
    pub fn values(&self) -> &[ParamValue] {
        if self.is_changed() {
            &self.current
        } else {
            &self.original
        }
    }

    /// Returns true if the current values differ from the original.
    pub fn is_changed(&self) -> bool {
        self.current != self.original
    }

    /// Replaces the current values if `values` differs element-wise.
    ///
    /// Returns true if the current values changed.
    pub fn commit(&mut self, values: Vec<ParamValue>) -> bool {
        if values == self.current {
            return false;
        }
        self.current = values;
        true
    }

    /// Consumes the snapshot, returning the read-through values.
    pub fn into_values(self) -> Vec<ParamValue> {
        if self.current != self.original {
            self.current
        } else {
            self.original
        }
    }
}
