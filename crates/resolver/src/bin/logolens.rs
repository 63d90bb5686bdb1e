// ABOUTME: CLI binary for the LogoLens logo resolver.
// ABOUTME: Resolves one or more website URLs and prints the logo URL or the full JSON result.

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use logolens_resolver::{ResolutionResult, Resolver};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Exit code when at least one input was not a usable URL.
const EXIT_INPUT_ERROR: u8 = 1;
/// Exit code when every input was valid but at least one had no logo.
const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "logolens")]
#[command(about = "Resolve a website URL to its logo image URL")]
struct Args {
    /// Output the full result as JSON instead of just the logo URL
    #[arg(long = "json")]
    json_output: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Base URL of the domain logo service
    #[arg(long = "logo-service-url")]
    logo_service_url: Option<String>,

    /// Base URL of the favicon service
    #[arg(long = "favicon-service-url")]
    favicon_service_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Website URLs or bare domains to resolve
    #[arg(required = true)]
    urls: Vec<String>,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn format_result(result: &ResolutionResult, json_output: bool) -> String {
    if json_output {
        return serde_json::to_string_pretty(result)
            .unwrap_or_else(|e| format!("{{\"success\":false,\"message\":\"{}\"}}", e));
    }
    match &result.logo_url {
        Some(url) => url.clone(),
        None => result.message.clone(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut builder = Resolver::builder().allow_private_networks(args.allow_private_networks);
    if let Some(url) = &args.logo_service_url {
        builder = builder.logo_service_url(url);
    }
    if let Some(url) = &args.favicon_service_url {
        builder = builder.favicon_service_url(url);
    }
    let resolver = match builder.build() {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let mut had_input_error = false;
    let mut had_miss = false;

    for input in &args.urls {
        match resolver.resolve(input).await {
            Ok(result) => {
                if !result.success {
                    had_miss = true;
                }
                println!("{}", format_result(&result, args.json_output));
            }
            Err(e) => {
                eprintln!("error resolving {:?}: {}", input, e);
                had_input_error = true;
            }
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", start.elapsed().as_millis());
    }

    if had_input_error {
        ExitCode::from(EXIT_INPUT_ERROR)
    } else if had_miss {
        ExitCode::from(EXIT_NOT_FOUND)
    } else {
        ExitCode::SUCCESS
    }
}
