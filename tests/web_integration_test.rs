//! Integration tests for the web boundary.
//!
//! These tests demonstrate the complete flow from request extraction through
//! filtering to reading parameters in a handler.

use std::sync::Arc;
use std::thread;

use param_guard::web::{
    filter_request, ExtractParams, FilterOutcome, ParamFilter, RequestAdapter, REJECT_STATUS,
};
use param_guard::{EngineError, Loader, ParamSource, RuleRegistry, TableHandle, GENERIC_REJECTION};

const SITE_CONFIG: &str = r#"{
    "enforcing": true,
    "chains": [
        {
            "param_name_pattern": "",
            "path_pattern": "",
            "rules": [
                { "rule": "trim" },
                { "rule": "replace-nbsp" }
            ]
        },
        {
            "param_name_pattern": "^(page|id)$",
            "path_pattern": "",
            "rules": [
                { "rule": "fail-if-not-regex-match", "settings": { "pattern": "^[0-9]+$" } }
            ]
        },
        {
            "param_name_pattern": "^bio$",
            "path_pattern": "^/profile",
            "rules": [
                { "rule": "sanitize-html", "settings": { "allowLinks": "true" } }
            ]
        },
        {
            "param_name_pattern": "^(bio|page|id|password)$",
            "param_name_negated": true,
            "path_pattern": "",
            "rules": [
                { "rule": "fail-if-contains-html", "settings": { "allowAmpersands": "true" } }
            ]
        }
    ]
}"#;

fn site_filter() -> ParamFilter {
    let table = Loader::new(Arc::new(RuleRegistry::with_builtins()))
        .preload_rules(true)
        .load_str(SITE_CONFIG)
        .expect("site config is valid");
    ParamFilter::new(table)
}

// A stand-in for a framework request type.
struct FormPost {
    id: &'static str,
    uri: &'static str,
    fields: Vec<(&'static str, &'static str)>,
}

impl ExtractParams for FormPost {
    fn extract_params(&self) -> RequestAdapter {
        RequestAdapter::new(self.id, self.uri).with_params(self.fields.iter().copied())
    }
}

// Handler that reads parameters the way application code would.
fn render_profile<S: ParamSource + ?Sized>(request: &S) -> String {
    format!(
        "{}|{}",
        request.param("name").unwrap_or_default(),
        request.param("bio").unwrap_or_default()
    )
}

#[test]
fn profile_update_is_cleaned_before_the_handler() {
    let post = FormPost {
        id: "req-profile-001",
        uri: "/profile/edit",
        fields: vec![
            ("name", "  Ada&nbsp;Lovelace "),
            (
                "bio",
                "<p onclick=\"x()\">Hi</p><script>steal()</script><a href=\"https://example.org\">me</a>",
            ),
            ("page", "2"),
        ],
    };
    let adapter = post.extract_params();

    let filter = site_filter();
    let filtered = filter
        .filter(&adapter)
        .expect("rules resolve")
        .into_filtered()
        .expect("request passes");

    assert_eq!(
        render_profile(&filtered),
        "Ada Lovelace|<p>Hi</p><a href=\"https://example.org\">me</a>"
    );
    assert_eq!(filtered.param("page"), Some("2"));
    assert!(!filtered.is_rewritten("page"));

    // the original request is untouched
    assert_eq!(adapter.param("name"), Some("  Ada&nbsp;Lovelace "));
}

#[test]
fn sanitized_bio_never_reassembles_dropped_markup() {
    let adapter = RequestAdapter::new("req-profile-010", "/profile/edit").with_params([
        ("bio", "<<x>script>alert(1)<</x>/script>"),
        ("name", "Ada"),
    ]);

    let filtered = site_filter()
        .filter(&adapter)
        .unwrap()
        .into_filtered()
        .unwrap();
    assert_eq!(
        filtered.param("bio"),
        Some("&lt;script&gt;alert(1)&lt;/script&gt;")
    );
}

#[test]
fn html_in_plain_fields_rejects_request() {
    let adapter = RequestAdapter::new("req-search-002", "/search")
        .with_params([("q", "<img src=x onerror=alert(1)>")]);

    let outcome = site_filter().filter(&adapter).expect("rules resolve");
    match &outcome {
        FilterOutcome::Reject(rejection) => {
            assert_eq!(rejection.param, "q");
            assert_eq!(rejection.rule, "fail-if-contains-html");
            assert_eq!(rejection.path, "/search");
        }
        FilterOutcome::Pass(_) => panic!("html should be rejected"),
    }
    assert_eq!(outcome.public_message(), Some(GENERIC_REJECTION));
    assert_eq!(REJECT_STATUS, 400);
}

#[test]
fn bio_outside_profile_is_checked_as_plain_text() {
    // bio is excluded from the HTML check but only sanitized under /profile
    let adapter = RequestAdapter::new("req-003", "/other").with_params([("bio", "<b>x</b>")]);

    let filtered = site_filter()
        .filter(&adapter)
        .unwrap()
        .into_filtered()
        .unwrap();
    assert_eq!(filtered.param("bio"), Some("<b>x</b>"));
}

#[test]
fn non_numeric_ids_reject() {
    let adapter = RequestAdapter::new("req-004", "/item").with_params([("id", "1 OR 1=1")]);
    let outcome = site_filter().filter(&adapter).unwrap();
    assert_eq!(outcome.rejection().map(|r| r.rule.as_str()), Some("fail-if-not-regex-match"));
}

#[test]
fn ampersands_are_allowed_in_plain_fields() {
    let adapter = RequestAdapter::new("req-005", "/search").with_params([("q", "fish & chips")]);
    assert!(site_filter().filter(&adapter).unwrap().is_pass());
}

#[test]
fn repeated_params_are_filtered_as_one_batch() {
    let mut adapter = RequestAdapter::new("req-006", "/search");
    adapter.add_param("tag", " a ");
    adapter.add_absent("tag");
    adapter.add_param("tag", "b ");

    let filtered = site_filter()
        .filter(&adapter)
        .unwrap()
        .into_filtered()
        .unwrap();
    assert_eq!(
        filtered.param_values("tag"),
        Some(&[Some("a".to_string()), None, Some("b".to_string())][..])
    );
}

#[test]
fn unresolvable_rule_is_an_engine_error() {
    let table = Loader::new(Arc::new(RuleRegistry::with_builtins()))
        .load_str(
            r#"{"chains":[{"param_name_pattern":"","path_pattern":"",
                "rules":[{"rule":"remove-regex-matches"}]}]}"#,
        )
        .unwrap();
    let adapter = RequestAdapter::new("req-007", "/").with_params([("q", "x")]);

    let err = filter_request(&table, &adapter).unwrap_err();
    assert!(matches!(err, EngineError::Resolution(_)));
    assert_eq!(err.public_message(), GENERIC_REJECTION);
}

#[test]
fn requests_without_params_pass() {
    let adapter = RequestAdapter::new("req-008", "/");
    let filtered = site_filter().filter(&adapter).unwrap().into_filtered().unwrap();
    assert!(filtered.overlay().is_empty());
    assert!(filtered.param_names().is_empty());
}

#[test]
fn concurrent_requests_share_one_table() {
    let handle = Arc::new(TableHandle::new(
        Loader::new(Arc::new(RuleRegistry::with_builtins()))
            .load_str(SITE_CONFIG)
            .unwrap(),
    ));

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let filter = ParamFilter::from_handle(Arc::clone(&handle));
            thread::spawn(move || {
                let adapter = RequestAdapter::new(format!("req-t{i}"), "/search")
                    .with_params([("q", format!("  term {i} "))]);
                let filtered = filter.filter(&adapter).unwrap().into_filtered().unwrap();
                filtered.param("q").map(str::to_string)
            })
        })
        .collect();

    for (i, worker) in workers.into_iter().enumerate() {
        assert_eq!(worker.join().unwrap(), Some(format!("term {i}")));
    }

    // every rule was constructed once and is now shared
    let table = handle.current();
    assert!(table.chains()[0].rules().iter().all(|r| r.is_resolved()));
}

#[test]
fn reload_swaps_tables_between_requests() {
    let filter = site_filter();
    let adapter = RequestAdapter::new("req-009", "/search").with_params([("q", "<b>")]);
    assert!(!filter.filter(&adapter).unwrap().is_pass());

    filter.reload(
        Loader::new(Arc::new(RuleRegistry::with_builtins()))
            .load_str(r#"{"chains":[]}"#)
            .unwrap(),
    );
    assert!(filter.filter(&adapter).unwrap().is_pass());
}
