// ABOUTME: FaviconServiceResolver queries a favicon-by-domain service at decreasing sizes.
// ABOUTME: Medium confidence for 64px and up, low below that.

use async_trait::async_trait;
use url::Url;

use super::{ResolveContext, Strategy};
use crate::model::{Candidate, ConfidenceTier, MethodTag, ValidatedLogo};

/// Smallest size that still earns medium confidence.
const MEDIUM_CONFIDENCE_MIN_SIZE: u32 = 64;

/// Queries `<service>?domain=<host>&sz=<size>` for each configured size.
#[derive(Debug, Clone)]
pub struct FaviconServiceResolver {
    service_url: String,
    sizes: Vec<u32>,
}

impl FaviconServiceResolver {
    pub fn new(service_url: impl Into<String>, sizes: Vec<u32>) -> Self {
        Self {
            service_url: service_url.into(),
            sizes,
        }
    }

    fn lookup_url(&self, host: &str, size: u32) -> Option<String> {
        let size = size.to_string();
        Url::parse_with_params(&self.service_url, [("domain", host), ("sz", size.as_str())])
            .ok()
            .map(|u| u.to_string())
    }
}

/// Confidence tier for a favicon of the given pixel size.
pub fn confidence_for_size(size: u32) -> ConfidenceTier {
    if size >= MEDIUM_CONFIDENCE_MIN_SIZE {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

#[async_trait]
impl Strategy for FaviconServiceResolver {
    fn method(&self) -> MethodTag {
        MethodTag::FaviconService
    }

    async fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Option<ValidatedLogo> {
        let host = ctx.target().host()?;
        for &size in &self.sizes {
            let Some(url) = self.lookup_url(&host, size) else {
                tracing::debug!(service = %self.service_url, "favicon service URL is invalid");
                return None;
            };
            let candidate = Candidate::remote(url, self.method());
            if let Some(logo) = ctx.validate(candidate, confidence_for_size(size)).await {
                return Some(logo);
            }
        }
        None
    }
}
