// ABOUTME: Markup helpers shared by the scraping strategies.
// ABOUTME: Attribute lookup over prioritized selectors and <base href> resolution.

//! Attribute extraction from parsed HTML.
//!
//! Key behaviors:
//! - Selectors are tried in order; invalid selectors are skipped.
//! - Values are trimmed; empty strings are treated as no match.

use scraper::{Html, Selector};

use crate::urls::{absolutize, is_http_url};

/// Extracts an attribute value from the first matching selector that yields a non-empty result.
pub fn extract_first_attr(doc: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    for &sel_str in selectors {
        let sel = match Selector::parse(sel_str) {
            Ok(s) => s,
            Err(_) => continue,
        };

        for el in doc.select(&sel) {
            if let Some(value) = el.value().attr(attr) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// Collects the first non-empty value for each `(selector, attribute)` pair, in pair order.
///
/// Pairs that match nothing contribute nothing; duplicate values are kept once.
pub fn extract_attr_values(doc: &Html, pairs: &[(&str, &str)]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for &(sel_str, attr) in pairs {
        if let Some(value) = extract_first_attr(doc, &[sel_str], attr) {
            if !out.contains(&value) {
                out.push(value);
            }
        }
    }
    out
}

/// The base URL for resolving references in a page.
///
/// Uses `<base href>` when it resolves to an absolute http(s) URL, otherwise the
/// page URL itself.
pub fn base_href(html: &str, page_url: &str) -> String {
    let doc = Html::parse_document(html);
    extract_first_attr(&doc, &["base[href]"], "href")
        .map(|href| absolutize(&href, page_url).url)
        .filter(|resolved| is_http_url(resolved))
        .unwrap_or_else(|| page_url.to_string())
}
