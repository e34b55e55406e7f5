//! DOM structure features

use super::lexical::netloc;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// JavaScript APIs used by kits to exfiltrate credentials
const NETWORK_JS_KEYWORDS: [&str; 4] = [
    "fetch(",
    "XMLHttpRequest",
    "navigator.sendBeacon",
    "new WebSocket",
];

/// Iframe dimensions that make the frame effectively invisible
const ZERO_SIZES: [&str; 2] = ["0", "1"];

fn base64_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"base64,[A-Za-z0-9+/=]+").expect("valid regex"))
}

fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(e) => {
            tracing::error!(selector = css, error = %e, "Invalid selector");
            Vec::new()
        }
    }
}

fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|v| !v.is_empty())
}

/// The URL an element loads: `src`, falling back to `href`
fn resource_ref<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    attr(element, "src").or_else(|| attr(element, "href"))
}

/// Netloc of `reference` if it differs from the page netloc
///
/// Relative references have an empty netloc, so they count as external
/// whenever the page itself has a host.
fn external_netloc(reference: &str, page_netloc: &str) -> Option<String> {
    netloc(reference).filter(|n| n != page_netloc)
}

/// Features derived from the parsed document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomFeatures {
    pub num_forms: usize,
    pub num_inputs: usize,
    pub num_links: usize,
    pub num_password_inputs: usize,
    pub num_hidden_inputs: usize,
    pub num_onclick_events: usize,
    pub num_hidden_elements: usize,
    pub has_iframe: bool,
    pub has_zero_sized_iframe: bool,
    /// A form posts to a different host
    pub suspicious_form_action: bool,
    pub has_script_eval: bool,
    pub has_network_js: bool,
    pub has_base64_in_js: bool,
    pub num_inline_scripts: usize,
    pub external_js_count: usize,
    pub external_iframe_count: usize,
    /// Distinct netlocs other than the page's referenced by scripts,
    /// stylesheets, images and frames; relative references count as one
    pub num_external_domains: usize,
}

impl DomFeatures {
    /// Computes DOM features; `raw_html` is scanned for script patterns
    pub fn from_document(document: &Html, raw_html: &str, page_netloc: &str) -> Self {
        let forms = select(document, "form");
        let inputs = select(document, "input");
        let iframes = select(document, "iframe");
        let scripts = select(document, "script");

        let input_type_count =
            |kind: &str| inputs.iter().filter(|i| i.value().attr("type") == Some(kind)).count();

        let external_domains: HashSet<String> =
            select(document, "script, link, img, iframe")
                .iter()
                .filter_map(resource_ref)
                .filter_map(|r| external_netloc(r, page_netloc))
                .collect();

        let has_zero_sized_iframe = iframes.iter().any(|frame| {
            ["width", "height"].iter().any(|dim| {
                frame
                    .value()
                    .attr(dim)
                    .is_some_and(|v| ZERO_SIZES.contains(&v))
            })
        });

        // Relative actions post back to the page host
        let suspicious_form_action = forms.iter().any(|form| {
            attr(form, "action").is_some_and(|action| {
                external_netloc(action, page_netloc).is_some_and(|n| !n.is_empty())
            })
        });

        let count_external_src = |elements: &[ElementRef<'_>]| {
            elements
                .iter()
                .filter_map(|el| attr(el, "src"))
                .filter(|src| external_netloc(src, page_netloc).is_some())
                .count()
        };

        Self {
            num_forms: forms.len(),
            num_inputs: inputs.len(),
            num_links: select(document, "a").len(),
            num_password_inputs: input_type_count("password"),
            num_hidden_inputs: input_type_count("hidden"),
            num_onclick_events: select(document, "[onclick]").len(),
            num_hidden_elements: select(
                document,
                r#"[style*="display:none"], [style*="visibility:hidden"]"#,
            )
            .len(),
            has_iframe: !iframes.is_empty(),
            has_zero_sized_iframe,
            suspicious_form_action,
            has_script_eval: raw_html.contains("eval("),
            has_network_js: NETWORK_JS_KEYWORDS.iter().any(|k| raw_html.contains(k)),
            has_base64_in_js: base64_re().is_match(raw_html),
            num_inline_scripts: scripts.iter().filter(|s| attr(s, "src").is_none()).count(),
            external_js_count: count_external_src(scripts.as_slice()),
            external_iframe_count: count_external_src(iframes.as_slice()),
            num_external_domains: external_domains.len(),
        }
    }
}
