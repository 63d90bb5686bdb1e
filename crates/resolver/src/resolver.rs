// ABOUTME: The Resolver struct: owns the HTTP client and pipeline and resolves raw input to a result.
// ABOUTME: Only input errors escape resolve(); every strategy failure ends in a clean result.

use std::net::ToSocketAddrs;

use crate::cache::ResolutionCache;
use crate::error::ResolveError;
use crate::options::{Options, ResolverBuilder};
use crate::pipeline::ResolverPipeline;
use crate::result::{classify, ResolutionResult};
use crate::strategies::ResolveContext;
use crate::urls::NormalizedUrl;

/// Maximum redirect hops followed for any single request.
const MAX_REDIRECTS: usize = 10;

/// Resolves website URLs to logo URLs.
///
/// Safe to share across tasks: `resolve` takes `&self` and keeps all per-request
/// state on its own stack.
#[derive(Debug)]
pub struct Resolver {
    opts: Options,
    http_client: reqwest::Client,
    pipeline: ResolverPipeline,
    cache: Option<ResolutionCache>,
}

impl Resolver {
    /// Create a new ResolverBuilder for configuring the resolver.
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Create a Resolver running the standard strategies.
    pub fn new(opts: Options) -> Result<Self, ResolveError> {
        let pipeline = ResolverPipeline::standard(&opts);
        Self::with_pipeline(opts, pipeline)
    }

    /// Create a Resolver running a custom pipeline.
    pub fn with_pipeline(opts: Options, pipeline: ResolverPipeline) -> Result<Self, ResolveError> {
        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => build_http_client(&opts)?,
        };
        let cache = opts.cache_capacity.map(ResolutionCache::new);

        Ok(Self {
            opts,
            http_client,
            pipeline,
            cache,
        })
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn pipeline(&self) -> &ResolverPipeline {
        &self.pipeline
    }

    /// Resolve raw user input (`nike.com`, `https://nike.com/`) to a logo.
    ///
    /// Returns `Err` only when the input cannot be turned into an http(s) URL.
    /// Exhaustion is a normal `success: false` result.
    pub async fn resolve(&self, raw_input: &str) -> Result<ResolutionResult, ResolveError> {
        let target = NormalizedUrl::parse(raw_input)?;

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(target.as_str()).await {
                tracing::debug!(url = %target, "resolution cache hit");
                return Ok(hit);
            }
        }

        let ctx = ResolveContext::new(&target, &self.http_client, &self.opts);
        let state = self.pipeline.run(&ctx).await;
        let result = classify(state);

        if !result.success {
            tracing::info!(url = %target, "no logo found");
        }

        if let Some(cache) = &self.cache {
            cache.put(target.as_str(), result.clone()).await;
        }

        Ok(result)
    }
}

fn build_http_client(opts: &Options) -> Result<reqwest::Client, ResolveError> {
    let allow_private = opts.allow_private_networks;
    let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let next = attempt.url().clone();
        if !allow_private {
            if let Some(host) = next.host_str() {
                let host = host.trim_start_matches('[').trim_end_matches(']');
                let port = next.port_or_known_default().unwrap_or(443);
                if let Ok(ip) = host.parse::<std::net::IpAddr>() {
                    if crate::resource::is_private_ip(&ip) {
                        return attempt.error("redirect to private IP blocked");
                    }
                } else {
                    // synchronous DNS resolution to avoid async in redirect policy
                    match (host, port).to_socket_addrs() {
                        Ok(addrs) => {
                            for sa in addrs {
                                if crate::resource::is_private_ip(&sa.ip()) {
                                    return attempt.error("redirect to private IP blocked");
                                }
                            }
                        }
                        Err(_) => {
                            return attempt.error("DNS lookup failed during redirect");
                        }
                    }
                }
            }
        }
        attempt.follow()
    });

    reqwest::Client::builder()
        .redirect(redirect_policy)
        .user_agent(&opts.user_agent)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .map_err(|e| {
            ResolveError::internal(
                "",
                "BuildHttpClient",
                Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
            )
        })
}
