// ABOUTME: The Strategy contract shared by all five resolvers and the per-request ResolveContext.
// ABOUTME: The context memoizes the page fetch and owns validation of candidates.

//! Resolver strategies.
//!
//! Each strategy is an independent value implementing [`Strategy`]. The pipeline
//! runs them in the order returned by [`standard_strategies`]. A strategy never
//! returns an error: every failure inside it degrades to `None`.

pub mod conventional;
pub mod domain_service;
pub mod favicon_service;
pub mod markup;
pub mod social_meta;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::extract::base_href;
use crate::model::{Candidate, ConfidenceTier, MethodTag, ValidatedLogo};
use crate::options::Options;
use crate::resource::{fetch_page, probe_image, FetchOptions, ProbeOptions};
use crate::urls::{is_http_url, NormalizedUrl};

pub use conventional::ConventionalFaviconResolver;
pub use domain_service::DomainLogoServiceResolver;
pub use favicon_service::FaviconServiceResolver;
pub use markup::MarkupScrapeResolver;
pub use social_meta::SocialMetaResolver;

/// Prefix every accepted inline candidate must carry.
pub const INLINE_SVG_PREFIX: &str = "data:image/svg+xml;base64,";

/// One way of discovering a logo for a target URL.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// The tag reported when this strategy wins.
    fn method(&self) -> MethodTag;

    /// Upper bound on the time this strategy may take.
    fn budget(&self, opts: &Options) -> Duration {
        opts.strategy_budget
    }

    /// Try to produce a validated logo. Failures map to `None`.
    async fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Option<ValidatedLogo>;
}

/// The five strategies in priority order.
pub fn standard_strategies(opts: &Options) -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(DomainLogoServiceResolver::new(opts.logo_service_url.clone())),
        Box::new(MarkupScrapeResolver),
        Box::new(SocialMetaResolver),
        Box::new(FaviconServiceResolver::new(
            opts.favicon_service_url.clone(),
            opts.favicon_sizes.clone(),
        )),
        Box::new(ConventionalFaviconResolver::new(opts.favicon_paths.clone())),
    ]
}

/// A fetched target page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Base for resolving references: `<base href>` if present, else the final URL.
    pub base_url: String,
    pub html: String,
}

/// Request-scoped state handed to every strategy.
///
/// Created per resolution and dropped with it; nothing here outlives a request.
pub struct ResolveContext<'a> {
    target: &'a NormalizedUrl,
    http: &'a reqwest::Client,
    opts: &'a Options,
    page: OnceCell<Option<Page>>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(target: &'a NormalizedUrl, http: &'a reqwest::Client, opts: &'a Options) -> Self {
        Self {
            target,
            http,
            opts,
            page: OnceCell::new(),
        }
    }

    pub fn target(&self) -> &NormalizedUrl {
        self.target
    }

    pub fn options(&self) -> &Options {
        self.opts
    }

    /// The target page, fetched on first use and shared by later strategies.
    ///
    /// A failed fetch is remembered too, so a dead site is only contacted once.
    pub async fn page(&self) -> Option<&Page> {
        self.page
            .get_or_init(|| async {
                let fetch_opts = FetchOptions {
                    headers: self.opts.headers.clone(),
                    allow_private_networks: self.opts.allow_private_networks,
                    timeout: self.opts.page_timeout,
                };
                match fetch_page(self.http, self.target.as_str(), &fetch_opts).await {
                    Ok(fetched) => {
                        let html = fetched.text_utf8();
                        let base_url = base_href(&html, &fetched.final_url);
                        Some(Page { base_url, html })
                    }
                    Err(e) => {
                        tracing::debug!(url = %self.target, error = %e, "page fetch failed");
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    /// Validate a candidate with the default probe timeout.
    pub async fn validate(
        &self,
        candidate: Candidate,
        confidence: ConfidenceTier,
    ) -> Option<ValidatedLogo> {
        self.validate_with_timeout(candidate, confidence, self.opts.probe_timeout)
            .await
    }

    /// Validate a candidate.
    ///
    /// Inline candidates are accepted only as base64 SVG data URIs and are never
    /// probed. Remote candidates must be absolute http(s) URLs that pass the probe.
    pub async fn validate_with_timeout(
        &self,
        candidate: Candidate,
        confidence: ConfidenceTier,
        timeout: Duration,
    ) -> Option<ValidatedLogo> {
        if candidate.is_inline_data {
            if is_inline_svg(&candidate.url) {
                return Some(ValidatedLogo::new(
                    candidate.url,
                    candidate.source_method,
                    confidence,
                ));
            }
            tracing::debug!(method = %candidate.source_method, "rejected non-SVG inline candidate");
            return None;
        }

        if !is_http_url(&candidate.url) {
            tracing::debug!(
                method = %candidate.source_method,
                url = %candidate.url,
                "rejected non-absolute candidate"
            );
            return None;
        }

        let probe_opts = ProbeOptions {
            allow_private_networks: self.opts.allow_private_networks,
            timeout,
        };
        match probe_image(self.http, &candidate.url, &probe_opts).await {
            Ok(()) => Some(ValidatedLogo::new(
                candidate.url,
                candidate.source_method,
                confidence,
            )),
            Err(e) => {
                tracing::debug!(
                    method = %candidate.source_method,
                    url = %candidate.url,
                    error = %e,
                    "candidate failed validation"
                );
                None
            }
        }
    }
}

/// True for `data:image/svg+xml;base64,...` URIs.
pub fn is_inline_svg(url: &str) -> bool {
    url.len() > INLINE_SVG_PREFIX.len()
        && url
            .get(..INLINE_SVG_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(INLINE_SVG_PREFIX))
}
