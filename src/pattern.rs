use std::fmt;

use regex::Regex;

/// A compiled, optionally negated pattern.
///
/// Matching is an unanchored search: the selector hits when the pattern is
/// found anywhere in the input. Anchor the pattern (`^...$`) for
/// whole-string semantics. With `negated` set, the selector picks exactly the
/// inputs the pattern does not find.
///
/// # Examples
///
/// ```
/// use param_guard::Selector;
///
/// let admin = Selector::new("^admin.*", true).unwrap();
/// assert!(admin.selects("userId"));
/// assert!(!admin.selects("adminToken"));
/// ```
#[derive(Clone)]
pub struct Selector {
    regex: Regex,
    negated: bool,
}

impl Selector {
    /// Compiles `pattern` into a selector.
    ///
    /// # Errors
    ///
    /// Returns the regex compiler error if `pattern` is malformed.
    pub fn new(pattern: &str, negated: bool) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            negated,
        })
    }

    /// Returns the source pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns true if the selector picks inputs the pattern does not find.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Returns true if the pattern is found anywhere in `input`.
    pub fn hits(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// Returns true if the selector picks `input`, after negation.
    pub fn selects(&self, input: &str) -> bool {
        self.hits(input) != self.negated
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("pattern", &self.pattern())
            .field("negated", &self.negated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_is_unanchored() {
        let selector = Selector::new("name", false).unwrap();
        assert!(selector.selects("username"));
        assert!(selector.selects("name_first"));
        assert!(!selector.selects("id"));
    }

    #[test]
    fn anchors_give_whole_string_semantics() {
        let selector = Selector::new("^name$", false).unwrap();
        assert!(selector.selects("name"));
        assert!(!selector.selects("username"));
    }

    #[test]
    fn negation_is_the_complement() {
        let plain = Selector::new("^admin.*", false).unwrap();
        let negated = Selector::new("^admin.*", true).unwrap();

        for input in ["adminToken", "userId", "", "xadmin"] {
            assert_eq!(plain.selects(input), !negated.selects(input), "{input}");
            assert_eq!(plain.hits(input), negated.hits(input));
        }
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        assert!(Selector::new("([unclosed", false).is_err());
    }

    #[test]
    fn empty_pattern_selects_everything() {
        let selector = Selector::new("", false).unwrap();
        assert!(selector.selects(""));
        assert!(selector.selects("/anything/at/all"));
        assert!(!selector.is_negated());
    }

    #[test]
    fn debug_shows_pattern() {
        let selector = Selector::new("^/search", true).unwrap();
        let output = format!("{:?}", selector);
        assert!(output.contains("^/search"));
        assert!(output.contains("negated: true"));
    }
}
