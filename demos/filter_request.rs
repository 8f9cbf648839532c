//! Request filtering demonstration.
//!
//! This example walks a few requests through a chain table:
//! 1. Load the table from a JSON document
//! 2. Build a request adapter from incoming parameters
//! 3. Filter it and hand the cleaned view to a handler
//! 4. Turn rejections into a generic client response
//!
//! Run with: `cargo run --example filter_request`

use std::sync::Arc;

use param_guard::web::{FilterOutcome, ParamFilter, RequestAdapter, REJECT_STATUS};
use param_guard::{Loader, ParamSource, RuleRegistry};

const CONFIG: &str = r#"{
    "enforcing": true,
    "chains": [
        {
            "param_name_pattern": "",
            "path_pattern": "",
            "rules": [{ "rule": "trim" }, { "rule": "replace-nbsp" }]
        },
        {
            "param_name_pattern": "^id$",
            "path_pattern": "",
            "rules": [
                { "rule": "fail-if-not-regex-match", "settings": { "pattern": "^[0-9]+$" } }
            ]
        },
        {
            "param_name_pattern": "^comment$",
            "path_pattern": "^/posts",
            "rules": [{ "rule": "sanitize-html", "settings": { "allowLinks": "true" } }]
        }
    ]
}"#;

/// Simulates a handler reading the filtered parameters
fn show_post<S: ParamSource + ?Sized>(request: &S) -> String {
    format!(
        "post {} with comment {:?}",
        request.param("id").unwrap_or("?"),
        request.param("comment").unwrap_or_default()
    )
}

/// Runs one request through the filter and prints the response
fn handle(filter: &ParamFilter, request: &RequestAdapter) {
    println!("\n=== {} {} ===", request.id(), request.path());
    for name in request.param_names() {
        println!("   in:  {} = {:?}", name, request.param(name));
    }

    match filter.filter(request) {
        Ok(FilterOutcome::Pass(filtered)) => {
            for name in filtered.param_names() {
                if filtered.is_rewritten(name) {
                    println!("   out: {} = {:?}", name, filtered.param(name));
                }
            }
            println!("✓ 200 {}", show_post(&filtered));
        }
        Ok(FilterOutcome::Reject(rejection)) => {
            println!("   operator: {}", rejection);
            println!("✗ {} {}", REJECT_STATUS, rejection.public_message());
        }
        Err(err) => {
            println!("   operator: {}", err);
            println!("✗ {} {}", REJECT_STATUS, err.public_message());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Request Filter Example ===");

    let table = Loader::new(Arc::new(RuleRegistry::with_builtins()))
        .preload_rules(true)
        .load_str(CONFIG)?;
    let filter = ParamFilter::new(table);

    // Scenario 1: clean values pass, markup in the comment is reduced
    handle(
        &filter,
        &RequestAdapter::new("req-0001", "/posts/7").with_params([
            ("id", " 7 "),
            (
                "comment",
                "<p onclick=\"steal()\">Nice&nbsp;post</p><script>steal()</script>",
            ),
        ]),
    );

    // Scenario 2: a non-numeric id rejects the whole request
    handle(
        &filter,
        &RequestAdapter::new("req-0002", "/posts/7").with_params([("id", "7 OR 1=1")]),
    );

    // Scenario 3: markup split by dropped tags stays text
    handle(
        &filter,
        &RequestAdapter::new("req-0003", "/posts/8")
            .with_params([("id", "8"), ("comment", "<<x>script>alert(1)<</x>/script>")]),
    );

    println!("\n=== Key Takeaways ===");
    println!("1. Chains are selected per parameter by name and path");
    println!("2. Handlers read a filtered view, the original request is untouched");
    println!("3. Clients only ever see a generic rejection message");

    Ok(())
}
