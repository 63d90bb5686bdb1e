// ABOUTME: Network access for the resolver: page fetching and image validity probing.
// ABOUTME: Handles SSRF protection, content-length limits, charset decoding, and strict timeouts.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use bytes::Bytes;
use ipnet::{Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;
use url::Url;

use crate::error::ResolveError;

/// Maximum allowed page size (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Accept header sent with page fetches, matching what desktop browsers send.
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Accept header sent with image probes.
const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/svg+xml,image/*,*/*;q=0.8";

static PRIVATE_V4: Lazy<Vec<Ipv4Net>> = Lazy::new(|| {
    [
        "10.0.0.0/8",
        "172.16.0.0/12",
        "192.168.0.0/16",
        "127.0.0.0/8",
        "169.254.0.0/16",
        "0.0.0.0/8",
        "100.64.0.0/10",
    ]
    .iter()
    .filter_map(|s| s.parse().ok())
    .collect()
});

static PRIVATE_V6: Lazy<Vec<Ipv6Net>> = Lazy::new(|| {
    ["fc00::/7", "fe80::/10"]
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect()
});

/// Options for fetching a page.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headers: HashMap::new(),
            allow_private_networks: false,
            timeout: Duration::from_secs(10),
        }
    }
}

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as UTF-8 text, using charset hints from the content-type header.
    pub fn text_utf8(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Check if an IP address is in a private/reserved range.
pub(crate) fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => PRIVATE_V4.iter().any(|net| net.contains(ip)),
        IpAddr::V6(ip) => {
            if ip.is_loopback() || ip.is_unspecified() {
                return true;
            }
            if let Some(v4) = ip.to_ipv4_mapped() {
                return PRIVATE_V4.iter().any(|net| net.contains(&v4));
            }
            PRIVATE_V6.iter().any(|net| net.contains(ip))
        }
    }
}

/// Reject URLs whose host is, or resolves to, a private address.
async fn ensure_public_target(url: &Url, original: &str, op: &str) -> Result<(), ResolveError> {
    let Some(host) = url.host_str() else {
        return Err(ResolveError::invalid_url(
            original,
            op,
            Some(anyhow::anyhow!("URL has no host")),
        ));
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(ResolveError::ssrf(
                original,
                op,
                Some(anyhow::anyhow!("private IP addresses are not allowed")),
            ));
        }
        return Ok(());
    }

    let port = url.port_or_known_default().unwrap_or(443);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        ResolveError::fetch(
            original,
            op,
            Some(anyhow::anyhow!("DNS lookup failed: {}", e)),
        )
    })?;
    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(ResolveError::ssrf(
                original,
                op,
                Some(anyhow::anyhow!("host resolves to a private IP address")),
            ));
        }
    }
    Ok(())
}

fn parse_http_url(url: &str, op: &str) -> Result<Url, ResolveError> {
    if url.is_empty() {
        return Err(ResolveError::invalid_url(url, op, None));
    }
    let parsed = Url::parse(url).map_err(|e| {
        ResolveError::invalid_url(url, op, Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ResolveError::invalid_url(
            url,
            op,
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }
    Ok(parsed)
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Fetch the HTML of a target page with a browser-like request.
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, ResolveError> {
    const OP: &str = "FetchPage";
    let parsed_url = parse_http_url(url, OP)?;

    if !opts.allow_private_networks {
        ensure_public_target(&parsed_url, url, OP).await?;
    }

    let mut request = client
        .get(parsed_url)
        .timeout(opts.timeout)
        .header(reqwest::header::ACCEPT, BROWSER_ACCEPT)
        .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9");
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| ResolveError::from_reqwest(url, OP, e))?;

    // Final hop after redirects.
    if !opts.allow_private_networks {
        ensure_public_target(response.url(), url, OP).await?;
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(ResolveError::fetch(
                url,
                OP,
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    if !response.status().is_success() {
        return Err(ResolveError::fetch(
            url,
            OP,
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ResolveError::from_reqwest(url, OP, e))?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(ResolveError::fetch(
            url,
            OP,
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    Ok(FetchResult {
        status,
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}

/// Options for probing a candidate image.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    pub allow_private_networks: bool,
    pub timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            allow_private_networks: false,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Probe a candidate URL with a single HEAD request.
///
/// Succeeds only on a 2xx response whose content type starts with `image/`.
/// Inline data URIs must not be passed here.
pub async fn probe_image(
    client: &reqwest::Client,
    url: &str,
    opts: &ProbeOptions,
) -> Result<(), ResolveError> {
    const OP: &str = "ProbeImage";
    let parsed_url = parse_http_url(url, OP)?;

    if !opts.allow_private_networks {
        ensure_public_target(&parsed_url, url, OP).await?;
    }

    let response = client
        .head(parsed_url)
        .timeout(opts.timeout)
        .header(reqwest::header::ACCEPT, IMAGE_ACCEPT)
        .send()
        .await
        .map_err(|e| ResolveError::from_reqwest(url, OP, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ResolveError::fetch(
            url,
            OP,
            Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
        ));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if !content_type.starts_with("image/") {
        return Err(ResolveError::not_image(
            url,
            OP,
            Some(anyhow::anyhow!("content type {:?}", content_type)),
        ));
    }

    Ok(())
}
