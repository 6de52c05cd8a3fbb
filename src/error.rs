//! Failure taxonomy for the generation pipeline
//!
//! A `PipelineFailure` carries a `FailureKind` for the caller and an optional
//! diagnostic payload for server-side logs. The payload is never part of the
//! `Display` output and never reaches a response body.

use strum_macros::Display;

/// Classified reason a generation did not produce a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FailureKind {
    /// Caller input violates the request shape
    InvalidRequest,
    /// No provider credential is configured
    MissingCredential,
    /// The provider call failed, timed out or returned a non-success status
    ProviderError,
    /// The extracted completion is not JSON
    MalformedJson,
    /// The JSON does not match the bundle contract
    SchemaMismatch,
}

impl FailureKind {
    /// Short message safe to show a caller
    pub const fn public_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::MissingCredential => "Missing provider API key",
            Self::ProviderError => "AI request failed",
            Self::MalformedJson | Self::SchemaMismatch => "Invalid JSON from AI",
        }
    }

    /// Whether the failure is the caller's fault rather than the deployment's or the provider's
    pub const fn is_caller_error(self) -> bool {
        matches!(self, Self::InvalidRequest)
    }
}

/// A classified pipeline failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {}", .kind.public_message())]
pub struct PipelineFailure {
    kind: FailureKind,
    detail: Option<String>,
}

impl PipelineFailure {
    pub fn new(kind: FailureKind) -> Self {
        Self { kind, detail: None }
    }

    /// Attach diagnostic text (raw provider output, validation path) for logs
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Diagnostic payload for server-side logging only
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn public_message(&self) -> &'static str {
        self.kind.public_message()
    }
}

impl From<FailureKind> for PipelineFailure {
    fn from(kind: FailureKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_never_includes_detail() {
        let failure = PipelineFailure::new(FailureKind::MalformedJson)
            .with_detail("Sure! Here is your JSON: {oops");
        let shown = failure.to_string();
        assert_eq!(shown, "MalformedJson: Invalid JSON from AI");
        assert!(!shown.contains("oops"));
        assert_eq!(failure.detail(), Some("Sure! Here is your JSON: {oops"));
    }

    #[test]
    fn test_output_failures_share_a_message() {
        assert_eq!(
            FailureKind::MalformedJson.public_message(),
            FailureKind::SchemaMismatch.public_message()
        );
        assert!(FailureKind::InvalidRequest.is_caller_error());
        assert!(!FailureKind::MissingCredential.is_caller_error());
    }
}
