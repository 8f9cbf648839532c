use regex::Regex;

use crate::error::{SettingsError, ValidationFailure};
use crate::rule::{check_present, map_present, ParamValue, Rule, Target};
use crate::settings::RuleSettings;

const PATTERN_KEY: &str = "pattern";

/// Strips every occurrence of text matched by the `pattern` setting.
///
/// The rule searches for a match, removes every literal occurrence of the
/// matched text, and searches again until the pattern no longer matches.
/// Removal can join fragments into a new match, which the next pass then
/// removes as well. An empty match ends the loop.
#[derive(Debug, Clone, Default)]
pub struct RemoveRegexMatches {
    pattern: Option<Regex>,
}

impl RemoveRegexMatches {
    fn strip(pattern: &Regex, value: &str) -> String {
        let mut fixed = value.to_string();
        loop {
            let matched = match pattern.find(&fixed) {
                Some(m) if !m.as_str().is_empty() => m.as_str().to_string(),
                _ => break,
            };
            fixed = fixed.replace(&matched, "");
        }
        fixed
    }
}

impl Rule for RemoveRegexMatches {
    fn configure(&mut self, settings: &RuleSettings) -> Result<(), SettingsError> {
        self.pattern = Some(settings.regex(PATTERN_KEY)?);
        Ok(())
    }

    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        match &self.pattern {
            Some(pattern) => Ok(map_present(values, |v| Self::strip(pattern, v))),
            None => Err(unconfigured()),
        }
    }
}

/// Rejects values in which the `pattern` setting finds no match.
///
/// The search is unanchored; anchor the pattern to require a full match.
#[derive(Debug, Clone, Default)]
pub struct FailIfNotRegexMatch {
    pattern: Option<Regex>,
}

impl Rule for FailIfNotRegexMatch {
    fn configure(&mut self, settings: &RuleSettings) -> Result<(), SettingsError> {
        self.pattern = Some(settings.regex(PATTERN_KEY)?);
        Ok(())
    }

    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        let pattern = self.pattern.as_ref().ok_or_else(unconfigured)?;
        check_present(values, |value| {
            if pattern.is_match(value) {
                Ok(())
            } else {
                Err(ValidationFailure::new(format!(
                    "value does not match the pattern `{}`",
                    pattern.as_str()
                )))
            }
        })
    }
}

// Only reachable when a rule is used without going through the registry.
fn unconfigured() -> ValidationFailure {
    ValidationFailure::new("rule used without a configured pattern")
}
