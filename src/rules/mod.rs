//! Built-in rules.
//!
//! | Identifier                  | Rule                      | Settings                                         |
//! |-----------------------------|---------------------------|--------------------------------------------------|
//! | `trim`                      | [`Trim`]                  |                                                  |
//! | `html-encode`               | [`HtmlEncode`]            |                                                  |
//! | `canonicalize`              | [`Canonicalize`]          |                                                  |
//! | `fail-if-not-canonicalized` | [`FailIfNotCanonicalized`]| `allowBackSlash`                                 |
//! | `numbers-only`              | [`NumbersOnly`]           |                                                  |
//! | `replace-nbsp`              | [`ReplaceNbsp`]           |                                                  |
//! | `remove-regex-matches`      | [`RemoveRegexMatches`]    | `pattern` (required)                             |
//! | `fail-if-not-regex-match`   | [`FailIfNotRegexMatch`]   | `pattern` (required)                             |
//! | `fail-if-contains-html`     | [`FailIfContainsHtml`]    | `allowAmpersands`, `allowAccents`, `allowPercents` |
//! | `sanitize-html`             | [`SanitizeHtml`]          | `allowLinks`                                     |
//! | `pass-through`              | [`PassThrough`]           |                                                  |
//! | `reject-all`                | [`RejectAll`]             |                                                  |
//!
//! Absent values pass through every built-in unchanged.

mod encode;
mod entities;
mod html;
mod pattern;
mod text;

pub use encode::{canonicalize, Canonicalize, FailIfNotCanonicalized, HtmlEncode};
pub use html::{FailIfContainsHtml, SanitizeHtml};
pub use pattern::{FailIfNotRegexMatch, RemoveRegexMatches};
pub use text::{NumbersOnly, ReplaceNbsp, Trim};

use crate::registry::RuleRegistry;
use crate::rule::{PassThrough, RejectAll};

/// Registers every built-in rule under its identifier.
pub fn register_builtins(registry: &mut RuleRegistry) {
    registry
        .register_default::<Trim>("trim")
        .register_default::<HtmlEncode>("html-encode")
        .register_default::<Canonicalize>("canonicalize")
        .register_default::<FailIfNotCanonicalized>("fail-if-not-canonicalized")
        .register_default::<NumbersOnly>("numbers-only")
        .register_default::<ReplaceNbsp>("replace-nbsp")
        .register_default::<RemoveRegexMatches>("remove-regex-matches")
        .register_default::<FailIfNotRegexMatch>("fail-if-not-regex-match")
        .register_default::<FailIfContainsHtml>("fail-if-contains-html")
        .register_default::<SanitizeHtml>("sanitize-html")
        .register_default::<PassThrough>("pass-through")
        .register_default::<RejectAll>("reject-all");
}
