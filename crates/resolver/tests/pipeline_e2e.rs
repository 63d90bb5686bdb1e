// ABOUTME: End-to-end tests for Resolver::resolve against mocked logo services and target sites.
// ABOUTME: Covers each strategy winning in turn, priority short-circuiting, validation, and caching.

use httpmock::prelude::*;
use logolens_resolver::resource::{probe_image, ProbeOptions};
use logolens_resolver::{ConfidenceTier, MethodTag, ResolutionResult, Resolver, NOT_FOUND_MESSAGE};
use pretty_assertions::assert_eq;

/// Nothing listens here; every request is refused immediately.
const DEAD_SERVICE: &str = "http://127.0.0.1:1";

fn resolver_for(server: &MockServer) -> Resolver {
    Resolver::builder()
        .allow_private_networks(true)
        .logo_service_url(server.url("/logos"))
        .favicon_service_url(server.url("/s2/favicons"))
        .build()
        .unwrap()
}

fn html_page<'a>(server: &'a MockServer, path: &str, body: &str) -> httpmock::Mock<'a> {
    let body = body.to_string();
    server.mock(|when, then| {
        when.method(GET).path(path.to_string());
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(body);
    })
}

fn image<'a>(server: &'a MockServer, path: &str) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.path(path.to_string());
        then.status(200).header("content-type", "image/png");
    })
}

#[tokio::test]
async fn domain_logo_service_wins_with_high_confidence() {
    let server = MockServer::start();
    let logo = image(&server, "/logos/nike.com");

    let result = resolver_for(&server).resolve("nike.com").await.unwrap();

    logo.assert_hits(1);
    assert_eq!(
        result,
        ResolutionResult {
            success: true,
            logo_url: Some(server.url("/logos/nike.com")),
            method: Some(MethodTag::DomainLogoService),
            confidence: Some(ConfidenceTier::High),
            message: "Logo found via domain logo service".to_string(),
        }
    );
}

#[tokio::test]
async fn markup_logo_is_absolutized() {
    let server = MockServer::start();
    html_page(
        &server,
        "/",
        r#"<html><body><header><img class="logo" src="/assets/logo.svg" alt="Acme"></header></body></html>"#,
    );
    let svg = server.mock(|when, then| {
        when.path("/assets/logo.svg");
        then.status(200).header("content-type", "image/svg+xml");
    });

    let result = resolver_for(&server)
        .resolve(&server.url("/"))
        .await
        .unwrap();

    svg.assert();
    assert!(result.success);
    assert_eq!(result.method, Some(MethodTag::MarkupScrape));
    assert_eq!(result.confidence, Some(ConfidenceTier::High));
    assert_eq!(result.logo_url, Some(server.url("/assets/logo.svg")));
}

#[tokio::test]
async fn social_meta_image_is_used_without_logo_markup() {
    let server = MockServer::start();
    html_page(
        &server,
        "/about",
        r#"<html><head><meta property="og:image" content="/og.png"></head><body><p>About us</p></body></html>"#,
    );
    image(&server, "/og.png");

    let result = resolver_for(&server)
        .resolve(&server.url("/about"))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.method, Some(MethodTag::SocialMeta));
    assert_eq!(result.confidence, Some(ConfidenceTier::Medium));
}

#[tokio::test]
async fn conventional_favicon_is_the_last_resort() {
    let server = MockServer::start();
    html_page(&server, "/", "<html><body><p>Under construction</p></body></html>");
    let ico = server.mock(|when, then| {
        when.path("/favicon.ico");
        then.status(200).header("content-type", "image/x-icon");
    });

    let result = resolver_for(&server)
        .resolve(&server.url("/"))
        .await
        .unwrap();

    ico.assert_hits(1);
    assert_eq!(
        result,
        ResolutionResult {
            success: true,
            logo_url: Some(server.url("/favicon.ico")),
            method: Some(MethodTag::ConventionalFavicon),
            confidence: Some(ConfidenceTier::Low),
            message: "Favicon found at a conventional path".to_string(),
        }
    );
}

#[tokio::test]
async fn unreachable_host_is_not_found() {
    let resolver = Resolver::builder()
        .allow_private_networks(true)
        .logo_service_url(DEAD_SERVICE)
        .favicon_service_url(format!("{}/s2/favicons", DEAD_SERVICE))
        .build()
        .unwrap();

    let result = resolver.resolve(DEAD_SERVICE).await.unwrap();

    assert_eq!(result, ResolutionResult::not_found());
    assert_eq!(result.message, NOT_FOUND_MESSAGE);
}

#[tokio::test]
async fn higher_priority_win_skips_page_fetch() {
    let server = MockServer::start();
    let page = html_page(
        &server,
        "/",
        r#"<html><body><img class="logo" src="/logo.png"></body></html>"#,
    );
    let host_logo = image(&server, "/logos/127.0.0.1");

    let result = resolver_for(&server)
        .resolve(&server.url("/"))
        .await
        .unwrap();

    host_logo.assert_hits(1);
    page.assert_hits(0);
    assert_eq!(result.method, Some(MethodTag::DomainLogoService));
}

#[tokio::test]
async fn broken_markup_candidate_falls_through_to_social_meta() {
    let server = MockServer::start();
    html_page(
        &server,
        "/",
        r#"<html><head><meta name="twitter:image" content="/card.png"></head>
        <body><img id="site-logo" src="/missing-logo.png"></body></html>"#,
    );
    let missing = server.mock(|when, then| {
        when.path("/missing-logo.png");
        then.status(404);
    });
    image(&server, "/card.png");

    let result = resolver_for(&server)
        .resolve(&server.url("/"))
        .await
        .unwrap();

    missing.assert_hits(1);
    assert_eq!(result.method, Some(MethodTag::SocialMeta));
    assert_eq!(result.logo_url, Some(server.url("/card.png")));
}

#[tokio::test]
async fn html_served_as_logo_is_rejected() {
    let server = MockServer::start();
    html_page(
        &server,
        "/",
        r#"<html><body><img class="logo" src="/logo"></body></html>"#,
    );
    html_page(&server, "/logo", "<html>not an image</html>");
    image(&server, "/favicon.svg");

    let result = resolver_for(&server)
        .resolve(&server.url("/"))
        .await
        .unwrap();

    assert_eq!(result.method, Some(MethodTag::ConventionalFavicon));
    assert_eq!(result.logo_url, Some(server.url("/favicon.svg")));
}

#[tokio::test]
async fn returned_remote_logo_passes_a_fresh_probe() {
    let server = MockServer::start();
    html_page(
        &server,
        "/",
        r#"<html><head><meta property="og:image" content="/share.png"></head>
        <body><nav><img src="/nav-mark.png"></nav></body></html>"#,
    );
    image(&server, "/share.png");
    image(&server, "/nav-mark.png");

    let result = resolver_for(&server)
        .resolve(&server.url("/"))
        .await
        .unwrap();

    assert_eq!(result.method, Some(MethodTag::MarkupScrape));
    assert_eq!(result.confidence, Some(ConfidenceTier::Medium));
    assert!(!result.is_inline());
    let logo_url = result.logo_url.expect("logo url");
    let opts = ProbeOptions {
        allow_private_networks: true,
        ..Default::default()
    };
    probe_image(&reqwest::Client::new(), &logo_url, &opts)
        .await
        .unwrap();
}

#[tokio::test]
async fn page_is_fetched_once_for_markup_and_social_meta() {
    let server = MockServer::start();
    let page = html_page(&server, "/", "<html><body>plain</body></html>");

    let result = resolver_for(&server)
        .resolve(&server.url("/"))
        .await
        .unwrap();

    assert!(!result.success);
    page.assert_hits(1);
}

#[tokio::test]
async fn cache_serves_repeat_requests() {
    let server = MockServer::start();
    let logo = image(&server, "/logos/nike.com");
    let resolver = Resolver::builder()
        .allow_private_networks(true)
        .logo_service_url(server.url("/logos"))
        .cache_capacity(16)
        .build()
        .unwrap();

    let first = resolver.resolve("nike.com").await.unwrap();
    let second = resolver.resolve("https://nike.com/").await.unwrap();

    logo.assert_hits(1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn invalid_input_is_an_error_not_a_result() {
    let resolver = Resolver::builder().build().unwrap();
    assert!(resolver.resolve("").await.unwrap_err().is_invalid_url());
    assert!(resolver
        .resolve("ftp://files.example.com")
        .await
        .unwrap_err()
        .is_invalid_url());
}
