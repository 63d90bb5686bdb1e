// ABOUTME: Authentication seam for the logo endpoint: the Authenticator trait and a static bearer-token impl.
// ABOUTME: Session validation itself lives outside this crate; deployments plug in their own Authenticator.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

const BEARER_PREFIX: &str = "Bearer ";

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Validates the credentials presented with a request.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `credentials` is the raw `Authorization` header value, if any.
    async fn authenticate(&self, credentials: Option<&str>) -> Result<Caller, AuthError>;
}

/// Accepts `Bearer <token>` for a fixed set of tokens. The token doubles as the caller id.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashSet<String>,
}

impl StaticTokenAuthenticator {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, credentials: Option<&str>) -> Result<Caller, AuthError> {
        let header = credentials
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::MissingCredentials)?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .ok_or(AuthError::InvalidCredentials)?;
        if self.tokens.contains(token) {
            Ok(Caller {
                id: token.to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_tokens() {
        let auth = StaticTokenAuthenticator::new(["race-admin"]);
        assert_eq!(
            auth.authenticate(Some("Bearer race-admin")).await,
            Ok(Caller {
                id: "race-admin".to_string()
            })
        );
        assert_eq!(
            auth.authenticate(None).await,
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            auth.authenticate(Some("  ")).await,
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            auth.authenticate(Some("Bearer nope")).await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            auth.authenticate(Some("Basic race-admin")).await,
            Err(AuthError::InvalidCredentials)
        );
    }
}
