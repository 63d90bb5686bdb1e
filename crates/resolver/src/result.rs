// ABOUTME: ResolutionResult, the only externally visible output of the resolver.
// ABOUTME: classify() maps the pipeline's terminal state to a result with method and confidence.

use serde::{Deserialize, Serialize};

use crate::model::{ConfidenceTier, MethodTag};
use crate::pipeline::PipelineState;

/// Message returned when every strategy came up empty.
pub const NOT_FOUND_MESSAGE: &str = "no logo found";

/// The outcome of resolving one input.
///
/// `success == false` always comes with `logo_url`, `method` and `confidence` unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub success: bool,
    pub logo_url: Option<String>,
    pub method: Option<MethodTag>,
    pub confidence: Option<ConfidenceTier>,
    pub message: String,
}

impl ResolutionResult {
    /// The exhausted result.
    pub fn not_found() -> Self {
        Self {
            success: false,
            logo_url: None,
            method: None,
            confidence: None,
            message: NOT_FOUND_MESSAGE.to_string(),
        }
    }

    /// True if the logo is an inline data URI rather than a remote URL.
    pub fn is_inline(&self) -> bool {
        self.logo_url
            .as_deref()
            .is_some_and(|u| u.starts_with("data:"))
    }
}

/// Package a terminal pipeline state as a [`ResolutionResult`].
///
/// Non-terminal states are treated as exhausted.
pub fn classify(state: PipelineState) -> ResolutionResult {
    match state {
        PipelineState::Success(logo) => ResolutionResult {
            success: true,
            message: logo.method().found_message().to_string(),
            method: Some(logo.method()),
            confidence: Some(logo.confidence()),
            logo_url: Some(logo.url().to_string()),
        },
        PipelineState::Exhausted | PipelineState::Pending | PipelineState::Trying(_) => {
            ResolutionResult::not_found()
        }
    }
}
