//! Visible-text extraction for text classifiers

use regex::Regex;
use scraper::{Html, Node};
use std::sync::OnceLock;

use crate::util::text::truncate_chars;

/// Elements whose text never renders
const INVISIBLE_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn disallowed_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s.,!?-]").expect("valid regex"))
}

/// Joins the trimmed text nodes of the document, skipping invisible elements
pub fn raw_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

/// Normalizes text: collapses whitespace, lower-cases, drops symbols
pub fn normalize(text: &str) -> String {
    let collapsed = whitespace_re().replace_all(text, " ");
    let lowered = collapsed.trim().to_lowercase();
    disallowed_chars_re().replace_all(&lowered, "").into_owned()
}

/// Visible, normalized text capped at `max_tokens` tokens and `max_chars` characters
pub fn visible_text(document: &Html, max_tokens: usize, max_chars: usize) -> String {
    let normalized = normalize(&raw_text(document));
    let joined = normalized
        .split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ");

    truncate_chars(&joined, max_chars).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_raw_text_skips_invisible_elements() {
        let html = r#"<html><head><title>Sign in</title><style>body{color:red}</style>
            <script>var token = "abc";</script></head>
            <body><h1>  Verify   your account </h1><noscript>Enable JS</noscript>
            <p>Enter <b>password</b></p></body></html>"#;

        assert_eq!(
            raw_text(&doc(html)),
            "Sign in Verify   your account Enter password"
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize("  Your ACCOUNT\nhas been   <locked>!  Call: 555-0100 © "),
            "your account has been locked! call 555-0100 "
        );
    }

    #[test]
    fn test_normalize_keeps_unicode_word_chars() {
        assert_eq!(normalize("Übermäßig €5"), "übermäßig 5");
    }

    #[test]
    fn test_visible_text_token_and_char_caps() {
        let html = "<p>one two three four five</p>";
        assert_eq!(visible_text(&doc(html), 3, 1000), "one two three");
        assert_eq!(visible_text(&doc(html), 10, 7), "one two");
    }

    #[test]
    fn test_visible_text_empty_body() {
        assert_eq!(visible_text(&doc("<html><body></body></html>"), 512, 20_000), "");
    }
}
