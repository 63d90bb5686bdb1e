// ABOUTME: URL normalization for user input and absolutization of references found in markup.
// ABOUTME: Pure functions with no I/O; both fail soft instead of erroring on unparseable input.

//! URL handling for the resolver.
//!
//! - [`NormalizedUrl::parse`] turns raw user input (`nike.com`, `https://nike.com/`)
//!   into the canonical absolute URL every strategy works from.
//! - [`absolutize`] resolves a reference found in fetched markup against the page
//!   base, flagging inline `data:` URIs.
//! - [`registrable_domain`] approximates the registrable part of a host name.

use url::{Host, Url};

use crate::error::ResolveError;

/// Two-label public suffixes that need one more label to form a registrable domain.
const SECOND_LEVEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "me.uk", "ltd.uk", "plc.uk", "com.au", "net.au",
    "org.au", "edu.au", "co.nz", "org.nz", "co.jp", "or.jp", "ne.jp", "com.br", "com.mx",
    "co.za", "com.cn", "co.in", "com.sg", "com.tr", "com.ar", "co.kr", "com.hk", "com.tw",
];

/// A canonical absolute URL derived once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    canonical: String,
    parsed: Option<Url>,
}

impl NormalizedUrl {
    /// Normalize raw user input into an absolute URL.
    ///
    /// Input without a scheme gets `https://`. A trailing slash on a bare root path
    /// is dropped so `https://nike.com/` and `nike.com` both become
    /// `https://nike.com`. When the result cannot be parsed, the concatenated string
    /// is kept as-is and strategies degrade on it individually.
    ///
    /// Fails only for empty input or a non-http(s) scheme.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResolveError::invalid_url(
                raw,
                "Normalize",
                Some(anyhow::anyhow!("empty URL")),
            ));
        }

        let lower = trimmed.to_ascii_lowercase();
        let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
            trimmed.to_string()
        } else if lower.contains("://") {
            return Err(ResolveError::invalid_url(
                raw,
                "Normalize",
                Some(anyhow::anyhow!("scheme must be http or https")),
            ));
        } else {
            format!("https://{}", trimmed.trim_start_matches('/'))
        };

        match Url::parse(&with_scheme) {
            Ok(parsed) if parsed.host_str().is_some() => Ok(Self {
                canonical: canonical_string(&parsed),
                parsed: Some(parsed),
            }),
            Ok(_) => Err(ResolveError::invalid_url(
                raw,
                "Normalize",
                Some(anyhow::anyhow!("URL has no host")),
            )),
            Err(e) => {
                tracing::warn!(
                    input = raw,
                    error = %e,
                    "could not parse input as URL, continuing with best-effort string"
                );
                Ok(Self {
                    canonical: with_scheme,
                    parsed: None,
                })
            }
        }
    }

    /// The canonical URL string.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// The structured URL, when the input parsed cleanly.
    pub fn url(&self) -> Option<&Url> {
        self.parsed.as_ref()
    }

    /// Lowercased host name.
    pub fn host(&self) -> Option<String> {
        match &self.parsed {
            Some(u) => u.host_str().map(|h| h.to_ascii_lowercase()),
            None => fallback_host(&self.canonical),
        }
    }

    /// `scheme://host[:port]` of the target site.
    pub fn origin(&self) -> String {
        match &self.parsed {
            Some(u) => u.origin().ascii_serialization(),
            None => self
                .canonical
                .trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/"),
        }
    }

    /// Registrable domain of the target host (see [`registrable_domain`]).
    pub fn registrable_domain(&self) -> Option<String> {
        match &self.parsed {
            Some(u) => match u.host()? {
                Host::Domain(d) => Some(registrable_domain(d)),
                Host::Ipv4(ip) => Some(ip.to_string()),
                Host::Ipv6(ip) => Some(format!("[{}]", ip)),
            },
            None => self.host().map(|h| registrable_domain(&h)),
        }
    }
}

impl std::fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical)
    }
}

fn canonical_string(url: &Url) -> String {
    let s = url.to_string();
    if url.path() == "/" && url.query().is_none() && url.fragment().is_none() {
        s.trim_end_matches('/').to_string()
    } else {
        s
    }
}

fn fallback_host(canonical: &str) -> Option<String> {
    let rest = canonical.split_once("://").map(|(_, r)| r)?;
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .rsplit('@')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Approximate the registrable domain of a host name.
///
/// Drops subdomains down to the last two labels, or three when the last two form a
/// known second-level public suffix (`co.uk`, `com.au`, ...). Hosts with fewer
/// labels are returned unchanged.
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.parse::<std::net::IpAddr>().is_ok() {
        return host;
    }
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        return labels.join(".");
    }
    let last_two = labels[labels.len() - 2..].join(".");
    let keep = if SECOND_LEVEL_SUFFIXES.contains(&last_two.as_str()) {
        3
    } else {
        2
    };
    labels[labels.len() - keep..].join(".")
}

/// A reference resolved against a page base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Absolutized {
    pub url: String,
    pub is_inline: bool,
}

/// Resolve a reference found in markup against the page's base URL.
///
/// Rules, in order: absolute http(s) is unchanged; protocol-relative gets `https:`;
/// `data:` URIs are unchanged and flagged inline; root-relative is joined to the
/// base origin; anything else goes through standard relative resolution. If the
/// base cannot be parsed the reference comes back unchanged.
pub fn absolutize(reference: &str, base: &str) -> Absolutized {
    let reference = reference.trim();
    let lower = reference.to_ascii_lowercase();

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Absolutized {
            url: reference.to_string(),
            is_inline: false,
        };
    }

    if reference.starts_with("//") {
        return Absolutized {
            url: format!("https:{}", reference),
            is_inline: false,
        };
    }

    if lower.starts_with("data:") {
        return Absolutized {
            url: reference.to_string(),
            is_inline: true,
        };
    }

    let Ok(base_url) = Url::parse(base) else {
        return Absolutized {
            url: reference.to_string(),
            is_inline: false,
        };
    };

    let url = if reference.starts_with('/') {
        format!("{}{}", base_url.origin().ascii_serialization(), reference)
    } else {
        base_url
            .join(reference)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| reference.to_string())
    };

    Absolutized {
        url,
        is_inline: false,
    }
}

/// True for absolute `http`/`https` URLs.
pub fn is_http_url(s: &str) -> bool {
    Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bare_domain_gets_https() {
        let n = NormalizedUrl::parse("nike.com").unwrap();
        assert_eq!(n.as_str(), "https://nike.com");
        assert_eq!(n.host().as_deref(), Some("nike.com"));
    }

    #[test]
    fn schemed_input_keeps_scheme_and_drops_root_slash() {
        assert_eq!(
            NormalizedUrl::parse("https://nike.com/").unwrap().as_str(),
            "https://nike.com"
        );
        assert_eq!(
            NormalizedUrl::parse("http://nike.com").unwrap().as_str(),
            "http://nike.com"
        );
        assert_eq!(
            NormalizedUrl::parse("  HTTPS://Nike.com/running/ ")
                .unwrap()
                .as_str(),
            "https://nike.com/running/"
        );
    }

    #[test]
    fn bare_domain_with_path_is_kept() {
        let n = NormalizedUrl::parse("example.com/events/2024").unwrap();
        assert_eq!(n.as_str(), "https://example.com/events/2024");
        assert_eq!(n.origin(), "https://example.com");
    }

    #[test]
    fn empty_and_foreign_scheme_are_input_errors() {
        assert!(NormalizedUrl::parse("").unwrap_err().is_invalid_url());
        assert!(NormalizedUrl::parse("   ").unwrap_err().is_invalid_url());
        assert!(NormalizedUrl::parse("ftp://example.com")
            .unwrap_err()
            .is_invalid_url());
    }

    #[test]
    fn unparseable_input_falls_back_to_concatenation() {
        let n = NormalizedUrl::parse("exa mple.com").unwrap();
        assert_eq!(n.as_str(), "https://exa mple.com");
        assert!(n.url().is_none());
        assert_eq!(n.host().as_deref(), Some("exa mple.com"));
        assert_eq!(n.origin(), "https://exa mple.com");
    }

    #[test]
    fn absolutize_table() {
        let base = "https://example.com/events/2024";
        assert_eq!(
            absolutize("/assets/logo.svg", base).url,
            "https://example.com/assets/logo.svg"
        );
        assert_eq!(
            absolutize("//cdn.example.com/logo.png", base).url,
            "https://cdn.example.com/logo.png"
        );
        assert_eq!(
            absolutize("https://other.org/logo.png", base).url,
            "https://other.org/logo.png"
        );
        assert_eq!(
            absolutize("img/logo.png", base).url,
            "https://example.com/events/img/logo.png"
        );
        assert_eq!(
            absolutize("../logo.png", "https://example.com/a/b/c").url,
            "https://example.com/a/logo.png"
        );
    }

    #[test]
    fn absolutize_flags_data_uris() {
        let got = absolutize("data:image/svg+xml;base64,PHN2Zz4=", "https://example.com");
        assert!(got.is_inline);
        assert_eq!(got.url, "data:image/svg+xml;base64,PHN2Zz4=");
    }

    #[test]
    fn absolutize_keeps_port_in_origin() {
        assert_eq!(
            absolutize("/logo.png", "http://127.0.0.1:8080/page").url,
            "http://127.0.0.1:8080/logo.png"
        );
    }

    #[test]
    fn absolutize_with_bad_base_is_unchanged() {
        let got = absolutize("logo.png", "not a url");
        assert_eq!(got.url, "logo.png");
        assert!(!got.is_inline);
    }

    #[test]
    fn registrable_domain_examples() {
        assert_eq!(registrable_domain("nike.com"), "nike.com");
        assert_eq!(registrable_domain("www.nike.com"), "nike.com");
        assert_eq!(registrable_domain("shop.eu.nike.com"), "nike.com");
        assert_eq!(registrable_domain("www.bbc.co.uk"), "bbc.co.uk");
        assert_eq!(registrable_domain("localhost"), "localhost");
        assert_eq!(registrable_domain("127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn normalized_registrable_domain() {
        let n = NormalizedUrl::parse("https://www.runclub.example.co.uk/races").unwrap();
        assert_eq!(n.registrable_domain().as_deref(), Some("example.co.uk"));
    }

    #[test]
    fn http_url_check() {
        assert!(is_http_url("https://example.com/logo.png"));
        assert!(!is_http_url("/logo.png"));
        assert!(!is_http_url("data:image/png;base64,AAAA"));
    }
}
