// ABOUTME: Main library entry point for the LogoLens logo resolver.
// ABOUTME: Re-exports the public API: Resolver, ResolverBuilder, ResolutionResult, ResolveError, Options.

//! LogoLens - resolves a website URL to a validated logo image URL.
//!
//! Strategies run in a fixed priority order (domain logo service, page markup,
//! social meta tags, favicon service, conventional favicon paths) and the first
//! candidate that survives an image probe wins.
//!
//! # Example
//!
//! ```no_run
//! use logolens_resolver::{Resolver, ResolveError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ResolveError> {
//!     let resolver = Resolver::builder().build()?;
//!     let result = resolver.resolve("nike.com").await?;
//!     if let Some(url) = &result.logo_url {
//!         println!("{url}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod extract;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod resolver;
pub mod resource;
pub mod result;
pub mod strategies;
pub mod urls;

pub use crate::error::{ErrorCode, ResolveError};
pub use crate::model::{Candidate, ConfidenceTier, MethodTag, ValidatedLogo};
pub use crate::options::{Options, ResolverBuilder};
pub use crate::pipeline::{PipelineState, ResolverPipeline};
pub use crate::resolver::Resolver;
pub use crate::result::{classify, ResolutionResult, NOT_FOUND_MESSAGE};
pub use crate::strategies::{ResolveContext, Strategy};
pub use crate::urls::{absolutize, Absolutized, NormalizedUrl};
