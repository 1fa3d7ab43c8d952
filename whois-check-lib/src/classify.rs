//! Classification of raw WHOIS responses.
//!
//! Registries answer in free text, so each TLD carries the substring that
//! means "available" and optionally one that means "premium". Matching is a
//! case-insensitive substring search with a fixed priority: available first,
//! then premium, otherwise the domain is taken and the response text is kept
//! for display.

use crate::types::{CheckMethod, LookupOutcome};
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

/// Prepended to every response before matching so that an empty response
/// is never an exact match for anything.
const SENTINEL: &str = " ---";

lazy_static! {
    static ref MARKUP: Regex =
        Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("markup pattern is valid");
}

/// Classify a response against a TLD's match strings.
///
/// # Arguments
///
/// * `raw_text` - Response exactly as received
/// * `available` - Substring meaning "available"; ignored when empty
/// * `premium` - Substring meaning "premium"; ignored when `None` or empty
/// * `method` - Protocol the response came from; HTTP responses have markup
///   stripped before being kept
pub fn classify(
    raw_text: &str,
    available: &str,
    premium: Option<&str>,
    method: CheckMethod,
) -> LookupOutcome {
    let haystack = format!("{}{}", SENTINEL, raw_text).to_lowercase();

    if contains_ignore_case(&haystack, available) {
        LookupOutcome::Available
    } else if premium.is_some_and(|p| contains_ignore_case(&haystack, p)) {
        LookupOutcome::Premium
    } else {
        LookupOutcome::Unavailable {
            raw_text: sanitize(raw_text, method == CheckMethod::Http),
        }
    }
}

/// `haystack` must already be lowercase.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.contains(&needle.to_lowercase())
}

/// Make response text safe to embed in HTML.
///
/// Markup is stripped first when `strip_markup` is set, then the text is
/// entity-escaped and line breaks get a `<br />` in front.
pub fn sanitize(text: &str, strip_markup: bool) -> String {
    let text = if strip_markup {
        strip_tags(text)
    } else {
        Cow::Borrowed(text)
    };
    nl2br(&escape_html(&text))
}

/// Remove HTML tags and comments.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    MARKUP.replace_all(text, "")
}

/// Escape the five characters that are special in HTML (`& < > " '`).
///
/// Other characters, including non-ASCII ones, pass through unchanged; the
/// output is UTF-8 so they need no named entities.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Insert `<br />` before every line break, keeping the break itself.
///
/// `\r\n` and `\n\r` count as a single break.
pub fn nl2br(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\r' && c != '\n' {
            output.push(c);
            continue;
        }

        output.push_str("<br />");
        output.push(c);
        let pair = if c == '\r' { '\n' } else { '\r' };
        if let Some(next) = chars.next_if_eq(&pair) {
            output.push(next);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_match() {
        let outcome = classify(
            "Domain Name: No match for example",
            "No match",
            None,
            CheckMethod::Socket,
        );
        assert_eq!(outcome, LookupOutcome::Available);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let outcome = classify("no MATCH for x", "No match", None, CheckMethod::Socket);
        assert_eq!(outcome, LookupOutcome::Available);
    }

    #[test]
    fn test_available_wins_over_premium() {
        let outcome = classify(
            "Premium name. Status: AVAILABLE",
            "available",
            Some("premium"),
            CheckMethod::Socket,
        );
        assert_eq!(outcome, LookupOutcome::Available);
    }

    #[test]
    fn test_premium_match() {
        let outcome = classify(
            "This is a premium domain",
            "not found",
            Some("PREMIUM DOMAIN"),
            CheckMethod::Socket,
        );
        assert_eq!(outcome, LookupOutcome::Premium);
    }

    #[test]
    fn test_no_match_is_unavailable_with_text() {
        let outcome = classify("status: REGISTERED", "AVAILABLE", None, CheckMethod::Socket);
        assert_eq!(
            outcome,
            LookupOutcome::Unavailable {
                raw_text: "status: REGISTERED".to_string()
            }
        );
    }

    #[test]
    fn test_empty_match_strings_never_match() {
        assert_eq!(
            classify("", "", Some(""), CheckMethod::Socket),
            LookupOutcome::Unavailable {
                raw_text: String::new()
            }
        );
        assert_eq!(
            classify("anything", "", None, CheckMethod::Socket),
            LookupOutcome::Unavailable {
                raw_text: "anything".to_string()
            }
        );
    }

    #[test]
    fn test_sentinel_is_not_part_of_kept_text() {
        match classify("taken", "free", None, CheckMethod::Socket) {
            LookupOutcome::Unavailable { raw_text } => assert!(!raw_text.contains("---")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_http_text_is_tag_stripped_then_escaped() {
        let outcome = classify(
            "<html><b>example.es</b> is taken & \"reserved\"</html>",
            "libre",
            None,
            CheckMethod::Http,
        );
        assert_eq!(
            outcome,
            LookupOutcome::Unavailable {
                raw_text: "example.es is taken &amp; &quot;reserved&quot;".to_string()
            }
        );
    }

    #[test]
    fn test_socket_text_is_escaped_not_stripped() {
        let outcome = classify(
            "Registrant: <abuse@example.com>",
            "No match",
            None,
            CheckMethod::Socket,
        );
        assert_eq!(
            outcome,
            LookupOutcome::Unavailable {
                raw_text: "Registrant: &lt;abuse@example.com&gt;".to_string()
            }
        );
    }

    #[test]
    fn test_strip_tags_removes_comments() {
        assert_eq!(strip_tags("a<!-- <b>x</b> -->b<br/>c"), "abc");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href='x'>&</a>"#),
            "&lt;a href=&#039;x&#039;&gt;&amp;&lt;/a&gt;"
        );
        assert_eq!(escape_html("Titular: José Müller © 2024"), "Titular: José Müller © 2024");
    }

    #[test]
    fn test_nl2br() {
        assert_eq!(nl2br("a\nb"), "a<br />\nb");
        assert_eq!(nl2br("a\r\nb"), "a<br />\r\nb");
        assert_eq!(nl2br("a\n\rb"), "a<br />\n\rb");
        assert_eq!(nl2br("a\n\nb"), "a<br />\n<br />\nb");
        assert_eq!(nl2br("no breaks"), "no breaks");
    }
}
