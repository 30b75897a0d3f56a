//! Syntactic URL validity checks

use url::Url;

/// Default limit on URL length in bytes
pub const DEFAULT_MAX_URL_LENGTH: usize = 2048;

const SCHEME_PREFIXES: [&str; 3] = ["http://", "https://", "ftp://"];

/// Minimal syntactic validity check
///
/// A URL is valid when it is non-empty, at most `max_len` bytes, parses, and
/// either starts with `http://`, `https://` or `ftp://` or contains a `.`.
/// Scheme-less inputs such as `no-scheme.com` are parsed as if `http://`
/// were prepended.
pub fn is_valid_url(url: &str, max_len: usize) -> bool {
    if url.is_empty() || url.len() > max_len {
        return false;
    }

    if !parses(url) {
        return false;
    }

    SCHEME_PREFIXES.iter().any(|p| url.starts_with(p)) || url.contains('.')
}

fn parses(url: &str) -> bool {
    if url.chars().any(char::is_control) {
        return false;
    }

    // A "://" after the first path or query delimiter belongs to the query,
    // not to a scheme
    match url.find("://") {
        Some(idx) if !url[..idx].contains(|c: char| matches!(c, '/' | '?' | '#')) => {
            valid_scheme(&url[..idx]) && Url::parse(url).is_ok()
        }
        _ => Url::parse(&format!("http://{}", url)).is_ok(),
    }
}

fn valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
