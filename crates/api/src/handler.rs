// ABOUTME: LogoEndpoint turns an authenticated JSON request into a resolver call and a status-coded JSON response.
// ABOUTME: Exhaustion is a 200; input problems are 400; anything unexpected (including panics) is a logged 500.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use futures::FutureExt;
use logolens_resolver::{ResolutionResult, Resolver};
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::auth::Authenticator;
use crate::error::ApiError;

/// A transport-neutral inbound request.
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    /// Raw `Authorization` header value.
    pub authorization: Option<String>,
    /// Raw JSON body, expected to be `{"url": "..."}`.
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(authorization: Option<&str>, body: impl Into<Bytes>) -> Self {
        Self {
            authorization: authorization.map(str::to_string),
            body: body.into(),
        }
    }
}

/// A transport-neutral response: status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    fn resolved(result: &ResolutionResult) -> Self {
        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(result.success));
        if let Some(url) = &result.logo_url {
            body.insert("logoUrl".into(), Value::String(url.clone()));
        }
        if let Some(method) = result.method {
            body.insert("method".into(), Value::String(method.as_str().to_string()));
        }
        if let Some(confidence) = result.confidence {
            body.insert("confidence".into(), Value::String(confidence.to_string()));
        }
        body.insert("message".into(), Value::String(result.message.clone()));
        Self {
            status: StatusCode::OK,
            body: Value::Object(body),
        }
    }

    fn failed(err: &ApiError) -> Self {
        Self {
            status: err.status(),
            body: serde_json::json!({
                "success": false,
                "message": err.public_message(),
            }),
        }
    }
}

/// The logo resolution endpoint.
///
/// Embedding servers translate their request type into [`ApiRequest`], call
/// [`LogoEndpoint::handle`], and write back the returned status and body. Dropping
/// the `handle` future cancels any in-flight resolution.
#[derive(Clone)]
pub struct LogoEndpoint {
    resolver: Arc<Resolver>,
    authenticator: Arc<dyn Authenticator>,
}

impl LogoEndpoint {
    pub fn new(resolver: Arc<Resolver>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            resolver,
            authenticator,
        }
    }

    pub async fn handle(&self, req: ApiRequest) -> ApiResponse {
        match self.process(req).await {
            Ok(result) => ApiResponse::resolved(&result),
            Err(err) => {
                match &err {
                    ApiError::Internal(detail) => {
                        tracing::error!(error = ?detail, "logo resolution failed");
                    }
                    other => tracing::debug!(error = %other, "logo request rejected"),
                }
                ApiResponse::failed(&err)
            }
        }
    }

    async fn process(&self, req: ApiRequest) -> Result<ResolutionResult, ApiError> {
        let caller = self
            .authenticator
            .authenticate(req.authorization.as_deref())
            .await?;
        let url = requested_url(&req.body)?;
        tracing::debug!(caller = %caller.id, url = %url, "logo resolution requested");

        match AssertUnwindSafe(self.resolver.resolve(&url))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) if e.is_invalid_url() => Err(ApiError::BadRequest("invalid url".into())),
            Ok(Err(e)) => Err(ApiError::Internal(anyhow::Error::new(e))),
            Err(panic) => Err(ApiError::Internal(anyhow::anyhow!(
                "resolver panicked: {}",
                panic_message(panic.as_ref())
            ))),
        }
    }
}

impl std::fmt::Debug for LogoEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoEndpoint")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// Pull a non-empty string `url` out of the JSON body.
fn requested_url(body: &[u8]) -> Result<String, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ApiError::BadRequest("request body must be JSON".into()))?;
    match value.get("url") {
        Some(Value::String(url)) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            Err(ApiError::BadRequest("url is required".into()))
        }
        Some(_) => Err(ApiError::BadRequest("url must be a string".into())),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
