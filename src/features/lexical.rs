//! URL string features
//!
//! Netloc handling follows generic URL splitting rather than full WHATWG
//! parsing: phishing URLs are frequently malformed and must still produce
//! features instead of an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::OnceLock;

const SUSPICIOUS_WORDS: [&str; 4] = ["login", "verify", "secure", "update"];

/// Free or abuse-heavy TLDs
const SUSPICIOUS_TLDS: [&str; 5] = ["tk", "ml", "ga", "cf", "gq"];

const LONG_QUERY_CHARS: usize = 100;

fn ip_address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"https?://[0-9]{1,3}(?:\.[0-9]{1,3}){3}").expect("valid regex")
    })
}

/// Components of a split URL, borrowed from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitUrl<'a> {
    pub scheme: &'a str,
    pub netloc: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub fragment: &'a str,
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Splits `input` into scheme, netloc, path, query and fragment
///
/// Relative references have an empty scheme and netloc. Returns `None` only
/// for netlocs with unbalanced IPv6 brackets.
pub fn split_url(input: &str) -> Option<SplitUrl<'_>> {
    let input = input.trim_start_matches(|c: char| c <= ' ');

    let (scheme, rest) = match input.find(':') {
        Some(idx) if is_scheme(&input[..idx]) => (&input[..idx], &input[idx + 1..]),
        _ => ("", input),
    };

    let (netloc, rest) = match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            (&after[..end], &after[end..])
        }
        None => ("", rest),
    };

    if netloc.contains('[') != netloc.contains(']') {
        return None;
    }

    let (rest, fragment) = rest.split_once('#').unwrap_or((rest, ""));
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

    Some(SplitUrl {
        scheme,
        netloc,
        path,
        query,
        fragment,
    })
}

/// Network location (`user@host:port`) of a URL, empty for relative references
pub fn netloc(input: &str) -> Option<String> {
    split_url(input).map(|s| s.netloc.to_string())
}

/// Host part of a netloc: no userinfo, no port, no IPv6 brackets
pub fn host_of(netloc: &str) -> &str {
    let host_port = netloc.rsplit_once('@').map_or(netloc, |(_, h)| h);

    if let Some(stripped) = host_port.strip_prefix('[') {
        return stripped.split(']').next().unwrap_or_default();
    }

    host_port.split(':').next().unwrap_or_default()
}

/// Public suffix of a host (`co.uk`, `com.ml`), empty for IP literals and
/// hosts whose suffix is not on the Public Suffix List
pub fn public_suffix(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    if host.is_empty() || host.parse::<IpAddr>().is_ok() {
        return String::new();
    }
    match psl::suffix(host.as_bytes()) {
        Some(suffix) if suffix.is_known() => String::from_utf8_lossy(suffix.as_bytes()).into_owned(),
        _ => String::new(),
    }
}

/// Features derived from the URL string alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlFeatures {
    /// Length in characters
    pub url_length: usize,
    pub num_dots: usize,
    pub has_at_symbol: bool,
    pub uses_https: bool,
    /// 1 if any of login/verify/secure/update appears, else 0
    pub suspicious_words: u8,
    pub has_ip_address: bool,
    pub num_subdomains: usize,
    pub is_suspicious_tld: bool,
    pub has_hyphen: bool,
    pub url_has_encoding: bool,
    pub url_has_long_query: bool,
    pub url_ends_with_exe: bool,
}

impl UrlFeatures {
    pub fn from_url(url: &str) -> Self {
        let split = split_url(url);
        let domain = split.map(|s| s.netloc).unwrap_or_default();
        let lowered = url.to_lowercase();

        let num_subdomains = if domain.is_empty() {
            0
        } else {
            domain.split('.').count().saturating_sub(2)
        };

        let tld = public_suffix(host_of(domain));

        Self {
            url_length: url.chars().count(),
            num_dots: url.matches('.').count(),
            has_at_symbol: url.contains('@'),
            uses_https: split.is_some_and(|s| s.scheme.eq_ignore_ascii_case("https")),
            suspicious_words: u8::from(SUSPICIOUS_WORDS.iter().any(|w| lowered.contains(w))),
            has_ip_address: ip_address_re().is_match(url),
            num_subdomains,
            is_suspicious_tld: SUSPICIOUS_TLDS.contains(&tld.as_str()),
            has_hyphen: domain.contains('-'),
            url_has_encoding: url.contains('%'),
            url_has_long_query: split.is_some_and(|s| s.query.chars().count() > LONG_QUERY_CHARS),
            url_ends_with_exe: lowered.ends_with(".exe"),
        }
    }
}
