// ABOUTME: MarkupScrapeResolver finds logo images and inline SVGs in the target page's HTML.
// ABOUTME: Prioritized logo/brand selectors first (high), then the first header/nav images (medium).

use aho_corasick::AhoCorasick;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{is_inline_svg, ResolveContext, Strategy};
use crate::model::{Candidate, ConfidenceTier, MethodTag, ValidatedLogo};
use crate::urls::absolutize;

/// Selectors for elements carrying logo/brand markers in class, id, or alt, highest priority first.
const LOGO_SELECTORS: &[&str] = &[
    "img.logo",
    "img#logo",
    ".logo img",
    "#logo img",
    "img[class*='logo']",
    "img[id*='logo']",
    "img[alt*='logo']",
    "img[alt*='Logo']",
    "img[alt*='LOGO']",
    "[class*='logo'] img",
    "[id*='logo'] img",
    ".navbar-brand img",
    "img[class*='brand']",
    "[class*='brand'] img",
    "header a[href='/'] img",
    "nav a[href='/'] img",
    "svg.logo",
    "svg[class*='logo']",
    "svg[id*='logo']",
    "[class*='logo'] svg",
    "[id*='logo'] svg",
    "[class*='brand'] svg",
    "header a[href='/'] svg",
];

/// Images inside header/navigation regions, scanned when no logo selector matches.
const HEADER_IMAGE_SELECTOR: &str = "header img, nav img, [role='banner'] img, [class*='header'] img, [id*='header'] img, [class*='navbar'] img";

/// How many header/nav images the fallback scan considers.
const HEADER_SCAN_LIMIT: usize = 5;

/// Image attributes holding the source, in lookup order.
const SOURCE_ATTRS: &[&str] = &[
    "src",
    "data-src",
    "data-lazy-src",
    "data-original",
    "srcset",
    "data-srcset",
];

/// URL fragments that mark tracking pixels and spacers.
const TRACKING_PATTERNS: &[&str] = &[
    "pixel",
    "tracking",
    "analytics",
    "beacon",
    "spacer",
    "clear.gif",
    "blank.gif",
    "1x1",
];

static TRACKING_MATCHER: Lazy<Option<AhoCorasick>> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(TRACKING_PATTERNS)
        .ok()
});

/// An `xmlns="..."` default namespace on the root `<svg>` tag (prefixed `xmlns:xlink` does not count).
static SVG_XMLNS_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?i)^<svg\b[^>]*\sxmlns\s*="#).ok());

static COMPILED_LOGO_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    LOGO_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

static COMPILED_HEADER_SELECTOR: Lazy<Option<Selector>> =
    Lazy::new(|| Selector::parse(HEADER_IMAGE_SELECTOR).ok());

/// Scrapes the target page for logo markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupScrapeResolver;

#[async_trait]
impl Strategy for MarkupScrapeResolver {
    fn method(&self) -> MethodTag {
        MethodTag::MarkupScrape
    }

    async fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Option<ValidatedLogo> {
        let page = ctx.page().await?;
        let candidates = collect_markup_candidates(&page.html, &page.base_url);
        if candidates.is_empty() {
            tracing::debug!(url = %ctx.target(), "no logo markup found");
        }

        for (candidate, confidence) in candidates {
            if let Some(logo) = ctx.validate(candidate, confidence).await {
                return Some(logo);
            }
        }
        None
    }
}

/// Ordered, de-duplicated candidates from the page markup.
///
/// Each logo selector contributes its first element with a usable source (high
/// confidence). The header/nav scan only runs when no selector produced anything.
pub fn collect_markup_candidates(html: &str, base_url: &str) -> Vec<(Candidate, ConfidenceTier)> {
    let doc = Html::parse_document(html);
    let mut out: Vec<(Candidate, ConfidenceTier)> = Vec::new();

    for selector in COMPILED_LOGO_SELECTORS.iter() {
        if let Some(candidate) = doc
            .select(selector)
            .find_map(|el| element_candidate(el, base_url))
        {
            push_unique(&mut out, candidate, ConfidenceTier::High);
        }
    }

    if out.is_empty() {
        if let Some(selector) = COMPILED_HEADER_SELECTOR.as_ref() {
            for el in doc.select(selector).take(HEADER_SCAN_LIMIT) {
                if let Some(candidate) = element_candidate(el, base_url) {
                    push_unique(&mut out, candidate, ConfidenceTier::Medium);
                }
            }
        }
    }

    out
}

fn push_unique(
    out: &mut Vec<(Candidate, ConfidenceTier)>,
    candidate: Candidate,
    confidence: ConfidenceTier,
) {
    if !out.iter().any(|(c, _)| c.url == candidate.url) {
        out.push((candidate, confidence));
    }
}

fn element_candidate(el: ElementRef<'_>, base_url: &str) -> Option<Candidate> {
    match el.value().name() {
        "svg" => Some(Candidate::inline(
            inline_svg_data_uri(&el.html()),
            MethodTag::MarkupScrape,
        )),
        "img" => image_candidate(el, base_url),
        _ => None,
    }
}

/// Source of an `<img>`, falling back to lazy-load attributes when `src` is
/// missing or a non-SVG data placeholder.
fn image_candidate(el: ElementRef<'_>, base_url: &str) -> Option<Candidate> {
    for attr in SOURCE_ATTRS {
        let Some(raw) = el.value().attr(attr) else {
            continue;
        };
        let raw = if attr.ends_with("srcset") {
            first_srcset_url(raw)
        } else {
            raw.trim()
        };
        if raw.is_empty() {
            continue;
        }

        let resolved = absolutize(raw, base_url);
        if resolved.is_inline {
            if is_inline_svg(&resolved.url) {
                return Some(Candidate::inline(resolved.url, MethodTag::MarkupScrape));
            }
            continue;
        }
        if is_tracking_url(&resolved.url) {
            return None;
        }
        return Some(Candidate::remote(resolved.url, MethodTag::MarkupScrape));
    }
    None
}

fn first_srcset_url(srcset: &str) -> &str {
    srcset
        .split(',')
        .next()
        .and_then(|entry| entry.split_whitespace().next())
        .unwrap_or("")
}

fn is_tracking_url(url: &str) -> bool {
    match TRACKING_MATCHER.as_ref() {
        Some(matcher) => matcher.is_match(url),
        None => false,
    }
}

/// Embed raw SVG markup as a base64 data URI, adding the SVG namespace if missing
/// so the image renders standalone.
pub fn inline_svg_data_uri(svg_markup: &str) -> String {
    let markup = svg_markup.trim();
    let has_namespace = SVG_XMLNS_RE
        .as_ref()
        .map_or(markup.contains("xmlns="), |re| re.is_match(markup));
    let markup = if has_namespace {
        markup.to_string()
    } else {
        markup.replacen("<svg", "<svg xmlns=\"http://www.w3.org/2000/svg\"", 1)
    };
    format!("data:image/svg+xml;base64,{}", BASE64.encode(markup.as_bytes()))
}
