// ABOUTME: ConventionalFaviconResolver probes well-known favicon paths at the site root.
// ABOUTME: Last resort in the pipeline; always low confidence.

use async_trait::async_trait;

use super::{ResolveContext, Strategy};
use crate::model::{Candidate, ConfidenceTier, MethodTag, ValidatedLogo};

/// Probes a fixed ordered list of root paths.
#[derive(Debug, Clone)]
pub struct ConventionalFaviconResolver {
    paths: Vec<String>,
}

impl ConventionalFaviconResolver {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl Strategy for ConventionalFaviconResolver {
    fn method(&self) -> MethodTag {
        MethodTag::ConventionalFavicon
    }

    async fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Option<ValidatedLogo> {
        let origin = ctx.target().origin();
        for path in &self.paths {
            let url = format!("{}/{}", origin, path.trim_start_matches('/'));
            let candidate = Candidate::remote(url, self.method());
            if let Some(logo) = ctx.validate(candidate, ConfidenceTier::Low).await {
                return Some(logo);
            }
        }
        None
    }
}
