//! Heuristic phishing features for a captured page
//!
//! Features come in two groups:
//! - URL features, always computed from the URL string alone
//! - DOM features, computed from the parsed HTML when it is present and
//!   small enough to parse
//!
//! Alongside the features, [`extract_features`] returns the page's visible
//! text, normalized for text classifiers.
//!
//! # Example
//!
//! ```
//! use phishharvest::features::{extract_features, ExtractOptions};
//!
//! let html = r#"<form action="http://collector.test/p"><input type="password"></form>"#;
//! let (text, features) = extract_features(
//!     "http://secure-login.example.tk/verify",
//!     Some(html),
//!     &ExtractOptions::default(),
//! );
//!
//! assert!(text.is_empty());
//! assert_eq!(features.url.suspicious_words, 1);
//! assert!(features.url.is_suspicious_tld);
//! assert_eq!(features.dom.num_password_inputs, 1);
//! assert!(features.dom.suspicious_form_action);
//! ```

pub mod dom;
pub mod lexical;
pub mod text;

pub use dom::DomFeatures;
pub use lexical::{netloc, UrlFeatures};

use serde::{Deserialize, Serialize};

/// Limits applied during extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Pages larger than this (in KiB of characters) skip DOM parsing
    pub max_size_kb: usize,

    /// Maximum number of whitespace tokens of visible text
    pub max_tokens: usize,

    /// Skip DOM parsing for pages above `max_size_kb`
    pub skip_dom_if_large: bool,

    /// Hard cap on visible text length, in characters
    pub max_chars: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_size_kb: 220,
            max_tokens: 512,
            skip_dom_if_large: true,
            max_chars: 20_000,
        }
    }
}

/// All features of one page, serialized as a flat object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhishFeatures {
    #[serde(flatten)]
    pub url: UrlFeatures,

    #[serde(flatten)]
    pub dom: DomFeatures,
}

/// Computes visible text and heuristic features for `url` and its HTML
///
/// Missing, blank or oversized HTML yields empty text and zeroed DOM
/// features; URL features are always filled in.
pub fn extract_features(
    page_url: &str,
    html: Option<&str>,
    options: &ExtractOptions,
) -> (String, PhishFeatures) {
    let url_features = UrlFeatures::from_url(page_url);

    let html = match html {
        Some(html) if !html.trim().is_empty() => html,
        _ => {
            return (
                String::new(),
                PhishFeatures {
                    url: url_features,
                    dom: DomFeatures::default(),
                },
            )
        }
    };

    if options.skip_dom_if_large && html.chars().count() > 1024 * options.max_size_kb {
        tracing::debug!(url = page_url, "Skipping DOM analysis for oversized page");
        return (
            String::new(),
            PhishFeatures {
                url: url_features,
                dom: DomFeatures::default(),
            },
        );
    }

    let document = scraper::Html::parse_document(html);
    let page_netloc = netloc(page_url).unwrap_or_default();

    let visible = text::visible_text(&document, options.max_tokens, options.max_chars);
    let dom = DomFeatures::from_document(&document, html, &page_netloc);

    (
        visible,
        PhishFeatures {
            url: url_features,
            dom,
        },
    )
}
