//! Property tests for selection and the rule contract.
//!
//! These tests validate invariants that must hold for arbitrary parameter
//! names, paths and values.

use std::sync::Arc;

use param_guard::rules::canonicalize;
use param_guard::{
    apply, Chain, ChainTable, ParamValue, RuleRegistry, RuleSettings, Selector, Target, Verdict,
};
use proptest::prelude::*;

const TARGET: Target<'static> = Target {
    param: "p",
    path: "/p",
};

// Strategy: Generate patterns that always compile
fn arb_pattern() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(""),
        Just("^admin.*"),
        Just("name"),
        Just("^[a-z]+$"),
        Just("[0-9]"),
        Just("^/api/"),
        Just("(?i)token"),
    ]
}

// Strategy: Generate parameter values, some absent, some hostile
fn arb_value() -> impl Strategy<Value = ParamValue> {
    prop::option::weighted(
        0.85,
        prop_oneof![
            ".*",
            "[ -~]{0,40}",
            Just("<script>alert(1)</script>".to_string()),
            Just("%26lt%3B&amp;&nbsp;\u{A0}".to_string()),
        ],
    )
}

fn arb_values() -> impl Strategy<Value = Vec<ParamValue>> {
    prop::collection::vec(arb_value(), 1..6)
}

// Every built-in along with settings it needs to configure.
fn builtins() -> Vec<(&'static str, RuleSettings)> {
    vec![
        ("trim", RuleSettings::new()),
        ("html-encode", RuleSettings::new()),
        ("canonicalize", RuleSettings::new()),
        ("fail-if-not-canonicalized", RuleSettings::new().with("allowBackSlash", "true")),
        ("numbers-only", RuleSettings::new()),
        ("replace-nbsp", RuleSettings::new()),
        ("remove-regex-matches", RuleSettings::new().with("pattern", "<[^>]*>")),
        ("fail-if-not-regex-match", RuleSettings::new().with("pattern", "[a-z]")),
        ("fail-if-contains-html", RuleSettings::new().with("allowAccents", "true")),
        ("sanitize-html", RuleSettings::new().with("allowLinks", "true")),
        ("pass-through", RuleSettings::new()),
        ("reject-all", RuleSettings::new()),
    ]
}

proptest! {
    /// Property: negation selects exactly the complement
    #[test]
    fn proptest_negation_is_complement(
        pattern in arb_pattern(),
        input in "[ -~]{0,20}"
    ) {
        let plain = Selector::new(pattern, false).unwrap();
        let negated = Selector::new(pattern, true).unwrap();

        prop_assert_eq!(plain.selects(&input), plain.hits(&input));
        prop_assert_eq!(negated.selects(&input), !plain.selects(&input));
    }

    /// Property: a chain applies iff both sides are selected
    #[test]
    fn proptest_chain_requires_both_sides(
        name_pattern in arb_pattern(),
        name_negated in any::<bool>(),
        path_pattern in arb_pattern(),
        path_negated in any::<bool>(),
        name in "[a-zA-Z0-9_]{0,12}",
        path in "/[a-z/]{0,12}"
    ) {
        let name_selector = Selector::new(name_pattern, name_negated).unwrap();
        let path_selector = Selector::new(path_pattern, path_negated).unwrap();
        let expected = name_selector.selects(&name) && path_selector.selects(&path);

        let chain = Chain::new(name_selector, path_selector);
        prop_assert_eq!(chain.matches(&name, &path), expected);
    }

    /// Property: every built-in returns one output per input
    #[test]
    fn proptest_builtins_preserve_arity(values in arb_values()) {
        let registry = RuleRegistry::with_builtins();

        for (id, settings) in builtins() {
            let rule = registry.create(id, &settings).unwrap();
            if let Ok(fixed) = rule.fix_values(TARGET, &values) {
                prop_assert_eq!(fixed.len(), values.len(), "rule {}", id);
                for (before, after) in values.iter().zip(&fixed) {
                    // absent stays absent
                    prop_assert_eq!(before.is_none(), after.is_none(), "rule {}", id);
                }
            }
        }
    }

    /// Property: canonical form is a fixed point of canonicalize
    #[test]
    fn proptest_canonicalize_is_idempotent(input in "[ -~]{0,40}") {
        let once = canonicalize(&input);
        // a fixed point, unless the round limit cut decoding short
        if canonicalize(&once) != once {
            prop_assert!(once.contains('%') || once.contains('&'));
        }
    }

    /// Property: monitoring mode never rejects and never grows the arity
    #[test]
    fn proptest_monitoring_never_rejects(values in arb_values()) {
        let mut table = ChainTable::new(Arc::new(RuleRegistry::with_builtins()));
        let any = || Selector::new("", false).unwrap();
        for (id, settings) in builtins() {
            table = table.with_chain(
                Chain::new(any(), any()).with_rule(param_guard::RuleDescriptor::new(id, settings)),
            );
        }

        match apply(&table, "p", "/p", values.clone()).unwrap() {
            Verdict::Accepted { values: fixed, changed, .. } => {
                prop_assert_eq!(fixed.len(), values.len());
                prop_assert_eq!(changed, fixed != values);
            }
            Verdict::Rejected(_) => prop_assert!(false, "monitoring mode rejected"),
        }
    }

    /// Property: trimmed values have no edge characters at or below U+0020
    #[test]
    fn proptest_trim_strips_edges(input in "\\PC{0,30}") {
        let registry = RuleRegistry::with_builtins();
        let rule = registry.create("trim", &RuleSettings::new()).unwrap();
        let fixed = rule.fix_value(TARGET, Some(input)).unwrap().unwrap();

        prop_assert!(fixed.chars().next().map_or(true, |c| c > ' '));
        prop_assert!(fixed.chars().last().map_or(true, |c| c > ' '));
    }
}
