use crate::error::ValidationFailure;
use crate::rule::{map_present, ParamValue, Rule, Target};

/// Strips leading and trailing whitespace and control characters
/// (everything at or below U+0020).
#[derive(Debug, Clone, Copy, Default)]
pub struct Trim;

impl Rule for Trim {
    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        Ok(map_present(values, |v| {
            v.trim_matches(|c: char| c <= ' ').to_string()
        }))
    }
}

/// Removes every character other than ASCII digits and `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumbersOnly;

impl Rule for NumbersOnly {
    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        Ok(map_present(values, |v| {
            v.chars().filter(|c| c.is_ascii_digit() || *c == '-').collect()
        }))
    }
}

const NBSP_FORMS: [&str; 4] = ["&nbsp;", "&#160;", "&#xa0;", "\u{A0}"];

/// Replaces non-breaking spaces, raw or entity encoded, with plain spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceNbsp;

impl Rule for ReplaceNbsp {
    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        Ok(map_present(values, |v| {
            NBSP_FORMS
                .iter()
                .fold(v.to_string(), |acc, form| acc.replace(form, " "))
        }))
    }
}
