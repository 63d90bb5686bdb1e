// ABOUTME: Library entry point for the LogoLens inbound API.
// ABOUTME: Re-exports LogoEndpoint, the request/response types, the Authenticator seam, and ApiError.

//! Transport-agnostic inbound endpoint for logo resolution.
//!
//! ```no_run
//! use std::sync::Arc;
//! use logolens_api::{ApiRequest, LogoEndpoint, StaticTokenAuthenticator};
//! use logolens_resolver::Resolver;
//!
//! # async fn run() -> Result<(), logolens_resolver::ResolveError> {
//! let endpoint = LogoEndpoint::new(
//!     Arc::new(Resolver::builder().build()?),
//!     Arc::new(StaticTokenAuthenticator::new(["secret"])),
//! );
//! let response = endpoint
//!     .handle(ApiRequest::new(Some("Bearer secret"), r#"{"url":"nike.com"}"#))
//!     .await;
//! println!("{} {}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod handler;

pub use crate::auth::{AuthError, Authenticator, Caller, StaticTokenAuthenticator};
pub use crate::error::{ApiError, INTERNAL_ERROR_MESSAGE};
pub use crate::handler::{ApiRequest, ApiResponse, LogoEndpoint};
