// ABOUTME: DomainLogoServiceResolver asks a public domain-to-logo service for the target's logo.
// ABOUTME: Wins with high confidence when the service answers with a real image.

use async_trait::async_trait;

use super::{ResolveContext, Strategy};
use crate::model::{Candidate, ConfidenceTier, MethodTag, ValidatedLogo};

/// Looks up `<service>/<registrable domain>`.
#[derive(Debug, Clone)]
pub struct DomainLogoServiceResolver {
    service_url: String,
}

impl DomainLogoServiceResolver {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
        }
    }

    fn lookup_url(&self, domain: &str) -> String {
        format!("{}/{}", self.service_url.trim_end_matches('/'), domain)
    }
}

#[async_trait]
impl Strategy for DomainLogoServiceResolver {
    fn method(&self) -> MethodTag {
        MethodTag::DomainLogoService
    }

    async fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Option<ValidatedLogo> {
        let domain = ctx.target().registrable_domain()?;
        let candidate = Candidate::remote(self.lookup_url(&domain), self.method());
        ctx.validate_with_timeout(
            candidate,
            ConfidenceTier::High,
            ctx.options().service_timeout,
        )
        .await
    }
}
