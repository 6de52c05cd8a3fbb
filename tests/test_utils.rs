#![allow(dead_code)]

use async_trait::async_trait;
use relnotes::{CompletionProvider, CompletionRequest, ProviderError};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider double that returns a canned reply and records every call
pub struct StubProvider {
    reply: Result<String, ProviderError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl StubProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            reply: Err(error),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .expect("stub mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(
        &self,
        _api_key: &SecretString,
        request: &CompletionRequest,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("stub mutex poisoned") = Some(request.clone());
        self.reply.clone()
    }
}

pub fn test_key() -> Option<SecretString> {
    Some(SecretString::from("sk-test".to_string()))
}

/// A candidate that satisfies the bundle contract
pub fn valid_bundle_json() -> Value {
    json!({
        "summary": "Fixes a crash in the parser.",
        "sections": {
            "features": [],
            "fixes": ["Fixed a null pointer in the parser"],
            "performance": [],
            "chores": []
        },
        "releaseNotes": "This release fixes a null pointer in the parser.",
        "markdown": "# Release Notes\n\n## Fixes\n- Fixed a null pointer in the parser",
        "html": "<h1>Release Notes</h1><h2>Fixes</h2><ul><li>Fixed a null pointer in the parser</li></ul>",
        "text": "Fixes: Fixed a null pointer in the parser",
        "social": {
            "twitter": "New release: parser crash fixed.",
            "linkedin": "Our latest release fixes a crash in the parser."
        }
    })
}

/// The valid candidate wrapped the way chat models often answer
pub fn fenced_bundle_text() -> String {
    format!(
        "```json\n{}\n```",
        serde_json::to_string_pretty(&valid_bundle_json()).expect("fixture serializes")
    )
}
