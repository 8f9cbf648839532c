use std::cell::RefCell;

use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use tendril::StrTendril;
use unicode_normalization::UnicodeNormalization;

use crate::error::{SettingsError, ValidationFailure};
use crate::rule::{check_present, map_present, ParamValue, Rule, Target};
use crate::settings::RuleSettings;

use super::entities;

/// Rejects values containing characters that HTML encoding would change.
///
/// Settings:
/// - `allowAmpersands`: ignore `&`
/// - `allowAccents`: check the canonical decomposition (NFD), so accented
///   letters that decompose into a base letter and a combining mark pass
/// - `allowPercents`: ignore `%`
#[derive(Debug, Clone, Copy, Default)]
pub struct FailIfContainsHtml {
    allow_ampersands: bool,
    allow_accents: bool,
    allow_percents: bool,
}

impl FailIfContainsHtml {
    fn is_special(&self, c: char) -> bool {
        match c {
            '&' if self.allow_ampersands => false,
            '%' if self.allow_percents => false,
            c => entities::name_for(c).is_some(),
        }
    }

    fn contains_special(&self, value: &str) -> bool {
        if self.allow_accents {
            value.nfd().any(|c| self.is_special(c))
        } else {
            value.chars().any(|c| self.is_special(c))
        }
    }
}

impl Rule for FailIfContainsHtml {
    fn configure(&mut self, settings: &RuleSettings) -> Result<(), SettingsError> {
        self.allow_ampersands = settings.flag("allowAmpersands", false);
        self.allow_accents = settings.flag("allowAccents", false);
        self.allow_percents = settings.flag("allowPercents", false);
        Ok(())
    }

    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        check_present(values, |value| {
            if self.contains_special(value) {
                Err(ValidationFailure::new(
                    "value contains special HTML characters",
                ))
            } else {
                Ok(())
            }
        })
    }
}

/// Block-level elements kept by [`SanitizeHtml`].
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote",
];

/// Inline formatting elements kept by [`SanitizeHtml`].
const INLINE_ELEMENTS: &[&str] = &[
    "b", "i", "font", "s", "u", "o", "sup", "sub", "ins", "del", "strong", "strike", "tt", "code",
    "big", "small", "span", "em",
];

const LINK_PROTOCOLS: &[&str] = &["http", "https"];

/// Reduces HTML to an allow-list of formatting elements.
///
/// The value is tokenized and written out again from scratch:
/// - allowed elements are emitted without attributes, and every one left
///   open is closed at the end, so the output is balanced
/// - `script` and `style` elements are removed with their content, as are
///   comments and doctypes
/// - any other tag is dropped while its text is kept
/// - text is re-escaped, so markup split across dropped tags cannot
///   reassemble into a live tag
///
/// With the `allowLinks` setting, `<a>` elements whose `href` is an absolute
/// `http` or `https` URL are kept with only that attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizeHtml {
    allow_links: bool,
}

impl SanitizeHtml {
    fn sanitize(&self, input: &str) -> String {
        let sink = SanitizeSink {
            allow_links: self.allow_links,
            state: RefCell::default(),
        };
        let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(input));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        tokenizer.sink.state.into_inner().finish()
    }
}

impl Rule for SanitizeHtml {
    fn configure(&mut self, settings: &RuleSettings) -> Result<(), SettingsError> {
        self.allow_links = settings.flag("allowLinks", false);
        Ok(())
    }

    fn fix_values(
        &self,
        _target: Target<'_>,
        values: &[ParamValue],
    ) -> Result<Vec<ParamValue>, ValidationFailure> {
        Ok(map_present(values, |v| self.sanitize(v)))
    }
}

struct SanitizeSink {
    allow_links: bool,
    state: RefCell<Sanitized>,
}

impl TokenSink for SanitizeSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        let mut state = self.state.borrow_mut();
        match token {
            Token::TagToken(tag) => state.tag(&tag, self.allow_links),
            Token::CharacterTokens(text) => {
                if state.dropping.is_none() {
                    push_escaped(&mut state.output, &text);
                }
                TokenSinkResult::Continue
            }
            _ => TokenSinkResult::Continue,
        }
    }
}

#[derive(Default)]
struct Sanitized {
    output: String,
    // kept elements still waiting for their end tag
    open: Vec<String>,
    // raw text element whose content is being skipped
    dropping: Option<String>,
}

impl Sanitized {
    fn tag(&mut self, tag: &Tag, allow_links: bool) -> TokenSinkResult<()> {
        let name: &str = &tag.name;

        if self.dropping.is_some() {
            if tag.kind == TagKind::EndTag && self.dropping.as_deref() == Some(name) {
                self.dropping = None;
            }
            return TokenSinkResult::Continue;
        }

        match tag.kind {
            TagKind::StartTag => self.start_tag(tag, name, allow_links),
            TagKind::EndTag => {
                self.end_tag(name);
                TokenSinkResult::Continue
            }
        }
    }

    fn start_tag(&mut self, tag: &Tag, name: &str, allow_links: bool) -> TokenSinkResult<()> {
        match name {
            "script" => {
                self.dropping = Some(name.to_string());
                return TokenSinkResult::RawData(RawKind::ScriptData);
            }
            "style" => {
                self.dropping = Some(name.to_string());
                return TokenSinkResult::RawData(RawKind::Rawtext);
            }
            "br" => self.output.push_str("<br>"),
            "a" if allow_links => {
                let href = tag
                    .attrs
                    .iter()
                    .find(|attr| attr.name.local.as_ref() == "href")
                    .map(|attr| &*attr.value)
                    .filter(|href| is_allowed_link(href));
                if let Some(href) = href {
                    self.output.push_str("<a href=\"");
                    push_escaped(&mut self.output, href.trim());
                    self.output.push_str("\">");
                    self.open.push(name.to_string());
                }
            }
            _ if BLOCK_ELEMENTS.contains(&name) || INLINE_ELEMENTS.contains(&name) => {
                self.output.push('<');
                self.output.push_str(name);
                self.output.push('>');
                self.open.push(name.to_string());
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }

    fn end_tag(&mut self, name: &str) {
        // end tags for elements that were never opened are dropped
        if let Some(pos) = self.open.iter().rposition(|open| open == name) {
            for open in self.open.drain(pos..).rev() {
                close(&mut self.output, &open);
            }
        }
    }

    fn finish(mut self) -> String {
        while let Some(open) = self.open.pop() {
            close(&mut self.output, &open);
        }
        self.output
    }
}

fn close(output: &mut String, name: &str) {
    output.push_str("</");
    output.push_str(name);
    output.push('>');
}

fn push_escaped(output: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            c => output.push(c),
        }
    }
}

fn is_allowed_link(href: &str) -> bool {
    let href = href.trim();
    match href.split_once(':') {
        Some((scheme, rest)) => {
            LINK_PROTOCOLS
                .iter()
                .any(|p| scheme.eq_ignore_ascii_case(p))
                && rest.starts_with("//")
        }
        None => false,
    }
}
