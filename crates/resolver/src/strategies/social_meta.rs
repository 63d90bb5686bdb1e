// ABOUTME: SocialMetaResolver reads Open Graph, Twitter, and itemprop image tags from the page.
// ABOUTME: Reuses the page already fetched for markup scraping; wins with medium confidence.

use async_trait::async_trait;
use scraper::Html;

use super::{ResolveContext, Strategy};
use crate::extract::extract_attr_values;
use crate::model::{Candidate, ConfidenceTier, MethodTag, ValidatedLogo};
use crate::urls::absolutize;

/// Social image tags in priority order.
const SOCIAL_IMAGE_TAGS: &[(&str, &str)] = &[
    ("meta[property='og:image']", "content"),
    ("meta[name='og:image']", "content"),
    ("meta[property='og:image:secure_url']", "content"),
    ("meta[name='twitter:image']", "content"),
    ("meta[property='twitter:image']", "content"),
    ("meta[name='twitter:image:src']", "content"),
    ("meta[itemprop='image']", "content"),
    ("link[itemprop='image']", "href"),
    ("img[itemprop='image']", "src"),
];

/// Reads social/structured-data image tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocialMetaResolver;

#[async_trait]
impl Strategy for SocialMetaResolver {
    fn method(&self) -> MethodTag {
        MethodTag::SocialMeta
    }

    async fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Option<ValidatedLogo> {
        let page = ctx.page().await?;
        for candidate in collect_social_candidates(&page.html, &page.base_url) {
            if let Some(logo) = ctx.validate(candidate, ConfidenceTier::Medium).await {
                return Some(logo);
            }
        }
        None
    }
}

/// Social image candidates in tag priority order, absolutized against the page base.
pub fn collect_social_candidates(html: &str, base_url: &str) -> Vec<Candidate> {
    let doc = Html::parse_document(html);
    let mut out: Vec<Candidate> = Vec::new();
    for raw in extract_attr_values(&doc, SOCIAL_IMAGE_TAGS) {
        let resolved = absolutize(&raw, base_url);
        let candidate = if resolved.is_inline {
            Candidate::inline(resolved.url, MethodTag::SocialMeta)
        } else {
            Candidate::remote(resolved.url, MethodTag::SocialMeta)
        };
        if !out.iter().any(|c| c.url == candidate.url) {
            out.push(candidate);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::urls::NormalizedUrl;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn og_image_comes_first() {
        let html = r#"<head>
            <meta name="twitter:image" content="https://cdn.test/twitter.png">
            <meta property="og:image" content="/og.png">
        </head>"#;
        let got: Vec<String> = collect_social_candidates(html, "https://club.test/about")
            .into_iter()
            .map(|c| c.url)
            .collect();
        assert_eq!(
            got,
            vec!["https://club.test/og.png", "https://cdn.test/twitter.png"]
        );
    }

    #[test]
    fn itemprop_image_is_last_resort() {
        let html = r#"<div itemscope><img itemprop="image" src="img/org.png"></div>"#;
        let got = collect_social_candidates(html, "https://club.test/about/");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].url, "https://club.test/about/img/org.png");
    }

    #[test]
    fn no_tags_no_candidates() {
        assert!(collect_social_candidates("<html></html>", "https://club.test").is_empty());
    }

    #[tokio::test]
    async fn validates_og_image_with_medium_confidence() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("content-type", "text/html")
                .body(r#"<html><head><meta property="og:image" content="/share.jpg"></head></html>"#);
        });
        server.mock(|when, then| {
            when.path("/share.jpg");
            then.status(200).header("content-type", "image/jpeg");
        });

        let target = NormalizedUrl::parse(&server.url("/")).unwrap();
        let http = reqwest::Client::new();
        let opts = Options {
            allow_private_networks: true,
            ..Default::default()
        };
        let ctx = ResolveContext::new(&target, &http, &opts);

        let logo = SocialMetaResolver.try_resolve(&ctx).await.expect("og:image validates");
        assert_eq!(logo.url(), server.url("/share.jpg"));
        assert_eq!(logo.method(), MethodTag::SocialMeta);
        assert_eq!(logo.confidence(), ConfidenceTier::Medium);
    }
}
