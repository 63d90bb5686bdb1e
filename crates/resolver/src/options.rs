// ABOUTME: Configuration options for the resolver and the ResolverBuilder fluent API.
// ABOUTME: Defaults cover timeouts, outbound service endpoints, favicon sizes/paths, and caching.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::error::ResolveError;
use crate::resolver::Resolver;

/// Desktop browser User-Agent; some sites reject obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Public domain-to-logo lookup service. The domain is appended as a path segment.
pub const DEFAULT_LOGO_SERVICE_URL: &str = "https://logo.clearbit.com";

/// Public favicon-by-domain service, queried with `domain` and `sz` parameters.
pub const DEFAULT_FAVICON_SERVICE_URL: &str = "https://www.google.com/s2/favicons";

/// Favicon service sizes, largest first.
pub const DEFAULT_FAVICON_SIZES: &[u32] = &[128, 64, 32];

/// Conventional favicon paths probed at the site root, in order.
pub const DEFAULT_FAVICON_PATHS: &[&str] = &[
    "/favicon.svg",
    "/favicon.png",
    "/apple-touch-icon.png",
    "/apple-touch-icon-precomposed.png",
    "/favicon-196x196.png",
    "/favicon-96x96.png",
    "/favicon-32x32.png",
    "/favicon.ico",
];

/// Configuration options for the resolver.
#[derive(Debug, Clone)]
pub struct Options {
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
    /// Per-probe timeout for image validity checks.
    pub probe_timeout: Duration,
    /// Timeout for fetching the target page.
    pub page_timeout: Duration,
    /// Timeout for the domain-logo service lookup.
    pub service_timeout: Duration,
    /// Hard cap on a single strategy, including all of its network calls.
    pub strategy_budget: Duration,
    pub logo_service_url: String,
    pub favicon_service_url: String,
    pub favicon_sizes: Vec<u32>,
    pub favicon_paths: Vec<String>,
    /// Enables the result cache when set.
    pub cache_capacity: Option<NonZeroUsize>,
    pub http_client: Option<reqwest::Client>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: HashMap::new(),
            allow_private_networks: false,
            probe_timeout: Duration::from_secs(5),
            page_timeout: Duration::from_secs(10),
            service_timeout: Duration::from_secs(5),
            strategy_budget: Duration::from_secs(15),
            logo_service_url: DEFAULT_LOGO_SERVICE_URL.to_string(),
            favicon_service_url: DEFAULT_FAVICON_SERVICE_URL.to_string(),
            favicon_sizes: DEFAULT_FAVICON_SIZES.to_vec(),
            favicon_paths: DEFAULT_FAVICON_PATHS.iter().map(|p| p.to_string()).collect(),
            cache_capacity: None,
            http_client: None,
        }
    }
}

/// Builder for constructing Resolver instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ResolverBuilder {
    opts: Options,
}

impl ResolverBuilder {
    /// Create a new ResolverBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add a custom header to page fetches.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Allow or disallow requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.opts.probe_timeout = timeout;
        self
    }

    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.opts.page_timeout = timeout;
        self
    }

    pub fn service_timeout(mut self, timeout: Duration) -> Self {
        self.opts.service_timeout = timeout;
        self
    }

    pub fn strategy_budget(mut self, budget: Duration) -> Self {
        self.opts.strategy_budget = budget;
        self
    }

    /// Set the domain-logo service base URL.
    pub fn logo_service_url(mut self, url: impl Into<String>) -> Self {
        self.opts.logo_service_url = url.into();
        self
    }

    /// Set the favicon service base URL.
    pub fn favicon_service_url(mut self, url: impl Into<String>) -> Self {
        self.opts.favicon_service_url = url.into();
        self
    }

    /// Set favicon service sizes, in the order they are tried.
    pub fn favicon_sizes(mut self, sizes: impl IntoIterator<Item = u32>) -> Self {
        self.opts.favicon_sizes = sizes.into_iter().collect();
        self
    }

    /// Set conventional favicon paths, in the order they are probed.
    pub fn favicon_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.favicon_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Cache up to `capacity` results keyed by normalized URL. Zero disables caching.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.opts.cache_capacity = NonZeroUsize::new(capacity);
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Build the Resolver with the configured options.
    pub fn build(self) -> Result<Resolver, ResolveError> {
        Resolver::new(self.opts)
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
