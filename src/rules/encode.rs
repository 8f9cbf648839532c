//! Entity encoding and canonicalization rules.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};

use crate::error::{SettingsError, ValidationFailure};
use crate::rule::{check_present, map_present, ParamValue, Rule, Target};
use crate::settings::RuleSettings;

use super::entities;

/// Upper bound on decoding passes. Values still changing after this many
/// passes are returned as decoded so far.
const MAX_ROUNDS: usize = 8;

/// Escapes HTML special characters as HTML 4 named entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEncode;

impl Rule for HtmlEncode {
    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        Ok(map_present(values, entities::encode))
    }
}

/// Reduces a value to its simplest form by undoing percent and HTML entity
/// encoding until nothing changes.
///
/// Double and mixed encodings such as `%26lt%3B` collapse to the plain
/// character (`<`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Canonicalize;

impl Rule for Canonicalize {
    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        Ok(map_present(values, canonicalize))
    }
}

/// Rejects values that are not already in canonical form.
///
/// Backslashes are treated as escape attempts and rejected unless the
/// `allowBackSlash` setting is true.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailIfNotCanonicalized {
    allow_backslash: bool,
}

impl Rule for FailIfNotCanonicalized {
    fn configure(&mut self, settings: &RuleSettings) -> Result<(), SettingsError> {
        self.allow_backslash = settings.flag("allowBackSlash", false);
        Ok(())
    }

    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        check_present(values, |value| {
            if !self.allow_backslash && value.contains('\\') {
                return Err(ValidationFailure::new("value contains a backslash escape"));
            }
            if canonicalize(value) != value {
                return Err(ValidationFailure::new("value is not in canonical form"));
            }
            Ok(())
        })
    }
}

/// Repeatedly percent-decodes and entity-decodes `input`.
pub fn canonicalize(input: &str) -> String {
    let mut current = input.to_string();
    for _ in 0..MAX_ROUNDS {
        let decoded = entities::decode(&percent_decode(&current));
        if decoded == current {
            break;
        }
        current = decoded;
    }
    current
}

/// Runs of adjacent `%XX` escapes.
static ESCAPE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:%[0-9A-Fa-f]{2})+").unwrap());

/// Decodes `%XX` escapes.
///
/// A run of adjacent escapes is decoded as UTF-8 when it forms valid UTF-8,
/// otherwise byte by byte as Latin-1. Malformed escapes are kept verbatim.
fn percent_decode(input: &str) -> Cow<'_, str> {
    ESCAPE_RUN.replace_all(input, |caps: &Captures<'_>| {
        let run = percent_decode_str(&caps[0]);
        match run.clone().decode_utf8() {
            Ok(text) => text.into_owned(),
            Err(_) => run.map(char::from).collect(),
        }
    })
}
