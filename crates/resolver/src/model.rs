// ABOUTME: Core data model: method tags, confidence tiers, candidates, and validated logos.
// ABOUTME: ValidatedLogo can only be built inside the crate, after validation or for inline SVG.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which strategy produced a logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodTag {
    DomainLogoService,
    MarkupScrape,
    SocialMeta,
    FaviconService,
    ConventionalFavicon,
}

impl MethodTag {
    /// All tags in pipeline priority order.
    pub const PRIORITY: [MethodTag; 5] = [
        MethodTag::DomainLogoService,
        MethodTag::MarkupScrape,
        MethodTag::SocialMeta,
        MethodTag::FaviconService,
        MethodTag::ConventionalFavicon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MethodTag::DomainLogoService => "domain_logo_service",
            MethodTag::MarkupScrape => "markup_scrape",
            MethodTag::SocialMeta => "social_meta",
            MethodTag::FaviconService => "favicon_service",
            MethodTag::ConventionalFavicon => "conventional_favicon",
        }
    }

    /// Human-readable message for a successful resolution.
    pub fn found_message(&self) -> &'static str {
        match self {
            MethodTag::DomainLogoService => "Logo found via domain logo service",
            MethodTag::MarkupScrape => "Logo found in page markup",
            MethodTag::SocialMeta => "Logo found in social meta tags",
            MethodTag::FaviconService => "Favicon found via favicon service",
            MethodTag::ConventionalFavicon => "Favicon found at a conventional path",
        }
    }
}

impl fmt::Display for MethodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse quality label on a validated logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        };
        f.write_str(s)
    }
}

/// An unvalidated logo hypothesis produced by one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub source_method: MethodTag,
    pub is_inline_data: bool,
}

impl Candidate {
    pub fn remote(url: impl Into<String>, source_method: MethodTag) -> Self {
        Self {
            url: url.into(),
            source_method,
            is_inline_data: false,
        }
    }

    pub fn inline(url: impl Into<String>, source_method: MethodTag) -> Self {
        Self {
            url: url.into(),
            source_method,
            is_inline_data: true,
        }
    }
}

/// A candidate that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedLogo {
    url: String,
    method: MethodTag,
    confidence: ConfidenceTier,
}

impl ValidatedLogo {
    pub(crate) fn new(url: String, method: MethodTag, confidence: ConfidenceTier) -> Self {
        Self {
            url,
            method,
            confidence,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> MethodTag {
        self.method
    }

    pub fn confidence(&self) -> ConfidenceTier {
        self.confidence
    }
}
