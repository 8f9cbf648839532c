use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Text shown to clients for every rejected or failed request.
///
/// Operators get the detailed reason through the logs; clients only ever see
/// this message so the response does not reveal which rule tripped.
pub const GENERIC_REJECTION: &str = "Invalid parameter data";

/// Errors that can occur in the parameter validation crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The chain table could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// A configured rule could not be instantiated.
    #[error("rule resolution failed: {0}")]
    Resolution(#[from] ResolutionError),
    /// A rule rejected a value it could not fix.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),
    /// A rule broke the batch transform contract.
    #[error("internal error: {0}")]
    Contract(#[from] ContractViolation),
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Resolution(e) => Error::Resolution(e),
            EngineError::Contract(e) => Error::Contract(e),
        }
    }
}

/// Which side of a chain a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternField {
    /// The parameter-name pattern.
    ParamName,
    /// The request-path pattern.
    Path,
}

impl fmt::Display for PatternField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternField::ParamName => write!(f, "parameter name"),
            PatternField::Path => write!(f, "path"),
        }
    }
}

/// A malformed chain table. Loading fails wholesale; nothing is served from a
/// partially built table.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The document is not a valid chain table.
    #[error("malformed {format} document: {reason}")]
    Parse {
        /// Name of the document format
        format: &'static str,
        /// Parser message
        reason: String,
    },
    /// The chain table could not be written back out.
    #[error("failed to render {format} document: {reason}")]
    Render {
        /// Name of the document format
        format: &'static str,
        /// Serializer message
        reason: String,
    },
    /// A chain pattern does not compile.
    #[error("chain {chain}: invalid {field} pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// Zero-based chain index
        chain: usize,
        /// Which pattern failed
        field: PatternField,
        /// The offending pattern text
        pattern: String,
        /// Regex compiler error
        #[source]
        source: regex::Error,
    },
    /// A rule record names an identifier the registry does not know.
    #[error("chain {chain}, rule {position}: unknown rule `{identifier}`")]
    UnknownRule {
        /// Zero-based chain index
        chain: usize,
        /// Zero-based position within the chain
        position: usize,
        /// The unknown identifier
        identifier: String,
    },
    /// A rule failed to resolve while preloading.
    #[error("chain {chain}, rule {position}: {source}")]
    Preload {
        /// Zero-based chain index
        chain: usize,
        /// Zero-based position within the chain
        position: usize,
        /// Why resolution failed
        #[source]
        source: ResolutionError,
    },
}

/// A rule refused its settings during configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A required setting is absent.
    #[error("missing required setting `{key}`")]
    Missing {
        /// Setting name
        key: String,
    },
    /// A setting is present but unusable.
    #[error("setting `{key}` is invalid: {reason}")]
    Invalid {
        /// Setting name
        key: String,
        /// Why the value was refused
        reason: String,
    },
}

/// A rule identifier could not be turned into a configured rule.
///
/// This is a server-side misconfiguration, never a client data problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No factory is registered under the identifier.
    #[error("no rule registered under `{0}`")]
    Unknown(String),
    /// The rule was constructed but rejected its settings.
    #[error("rule `{rule}` could not be configured: {source}")]
    Configure {
        /// Rule identifier
        rule: String,
        /// Settings problem
        #[source]
        source: SettingsError,
    },
}

/// A rule rejected a value it cannot fix.
///
/// The message describes the violated constraint. It never echoes the
/// rejected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    message: String,
}

impl ValidationFailure {
    /// Creates a new validation failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A rule returned a different number of values than it was given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule `{rule}` returned {actual} values for {expected} inputs")]
pub struct ContractViolation {
    /// Rule identifier
    pub rule: String,
    /// Number of values passed in
    pub expected: usize,
    /// Number of values returned
    pub actual: usize,
}

/// Fatal engine failures. Both abort the request regardless of enforcing
/// mode and are reported as server-side problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A rule could not be resolved on first use.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// A rule broke the same-length output contract.
    #[error(transparent)]
    Contract(#[from] ContractViolation),
}

impl EngineError {
    /// Returns the generic text to show the client.
    pub fn public_message(&self) -> &'static str {
        GENERIC_REJECTION
    }
}

/// An enforcing-mode rejection of the whole request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Identifier of the rule that rejected the value
    pub rule: String,
    /// Parameter being validated
    pub param: String,
    /// Target path of the request
    pub path: String,
    /// Why the rule rejected the value
    pub failure: ValidationFailure,
}

impl Rejection {
    /// Returns the human-readable reason for operators.
    pub fn reason(&self) -> &str {
        self.failure.message()
    }

    /// Returns the generic text to show the client.
    pub fn public_message(&self) -> &'static str {
        GENERIC_REJECTION
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parameter `{}` on `{}` rejected by `{}`: {}",
            self.param, self.path, self.rule, self.failure
        )
    }
}

impl std::error::Error for Rejection {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_display_names_rule_and_param() {
        let rejection = Rejection {
            rule: "fail-if-contains-html".to_string(),
            param: "q".to_string(),
            path: "/search".to_string(),
            failure: ValidationFailure::new("value contains HTML special characters"),
        };

        let output = rejection.to_string();
        assert!(output.contains("`q`"));
        assert!(output.contains("/search"));
        assert!(output.contains("fail-if-contains-html"));
        assert_eq!(rejection.reason(), "value contains HTML special characters");
        assert_eq!(rejection.public_message(), GENERIC_REJECTION);
    }

    #[test]
    fn engine_error_converts_into_crate_error() {
        let err: Error = EngineError::Contract(ContractViolation {
            rule: "trim".to_string(),
            expected: 2,
            actual: 1,
        })
        .into();

        assert!(matches!(err, Error::Contract(_)));
        assert!(err.to_string().contains("returned 1 values for 2 inputs"));
    }

    #[test]
    fn resolution_error_keeps_settings_source() {
        let err = ResolutionError::Configure {
            rule: "remove-regex-matches".to_string(),
            source: SettingsError::Missing {
                key: "pattern".to_string(),
            },
        };

        let output = err.to_string();
        assert!(output.contains("remove-regex-matches"));
        assert!(output.contains("pattern"));
        assert_eq!(EngineError::from(err).public_message(), GENERIC_REJECTION);
    }

    #[test]
    fn pattern_field_display() {
        assert_eq!(PatternField::ParamName.to_string(), "parameter name");
        assert_eq!(PatternField::Path.to_string(), "path");
    }
}
