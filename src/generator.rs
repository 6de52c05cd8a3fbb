use crate::config::ProviderSettings;
use crate::error::{FailureKind, PipelineFailure};
use crate::extract::extract;
use crate::prompt;
use crate::providers::{CompletionProvider, CompletionRequest, ProviderError};
use crate::request;
use crate::types::{GenerationRequest, ReleaseNotesBundle};
use crate::validator::parse_and_validate;
use crate::{log_debug, log_error, log_info};

use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Turns commit logs into validated release notes bundles.
///
/// The provider and credential are injected at construction; the generator
/// itself keeps no state between calls.
pub struct ReleaseNotesGenerator {
    provider: Arc<dyn CompletionProvider>,
    credential: Option<SecretString>,
    model: String,
    temperature: f64,
}

impl ReleaseNotesGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, credential: Option<SecretString>) -> Self {
        let defaults = ProviderSettings::default();
        Self {
            provider,
            credential,
            model: defaults.model,
            temperature: defaults.temperature,
        }
    }

    /// Build a generator using the model and temperature from `settings`
    pub fn from_settings(
        settings: &ProviderSettings,
        provider: Arc<dyn CompletionProvider>,
        credential: Option<SecretString>,
    ) -> Self {
        Self::new(provider, credential)
            .with_model(settings.model.clone())
            .with_temperature(settings.temperature)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Validate an untyped request body, then generate
    pub async fn generate_from_value(
        &self,
        input: Value,
    ) -> Result<ReleaseNotesBundle, PipelineFailure> {
        let request = request::validate(input).map_err(|e| {
            log_info!("Rejected generation request: {}", e);
            PipelineFailure::new(FailureKind::InvalidRequest).with_detail(e.to_string())
        })?;
        self.generate(&request).await
    }

    /// Generate release notes for a request.
    ///
    /// Makes at most one provider call (plus any retries the provider itself
    /// is configured for). Nothing is post-processed: the bundle is returned
    /// exactly as validated.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ReleaseNotesBundle, PipelineFailure> {
        let generation_id = Uuid::new_v4();

        request::ensure_valid(request).map_err(|e| {
            log_info!("[{}] Rejected generation request: {}", generation_id, e);
            PipelineFailure::new(FailureKind::InvalidRequest).with_detail(e.to_string())
        })?;

        let Some(api_key) = self.credential.as_ref() else {
            log_error!(
                "[{}] No provider API key configured; refusing to call the provider",
                generation_id
            );
            return Err(FailureKind::MissingCredential.into());
        };

        let completion_request = CompletionRequest {
            model: self.model.clone(),
            system_prompt: prompt::create_system_prompt(),
            user_prompt: prompt::create_user_prompt(request),
            temperature: self.temperature,
        };
        log_debug!(
            "[{}] Requesting release notes: {} chars of commits, style {:?}, product {:?}, version {:?}",
            generation_id,
            request.raw.len(),
            request.style,
            request.product_name,
            request.version
        );

        let raw = self
            .provider
            .complete(api_key, &completion_request)
            .await
            .map_err(|e| {
                log_error!("[{}] Provider call failed: {}", generation_id, e);
                PipelineFailure::new(FailureKind::ProviderError).with_detail(provider_detail(&e))
            })?;
        log_debug!(
            "[{}] Provider returned {} chars",
            generation_id,
            raw.len()
        );

        let bundle = parse_and_validate(extract(&raw)).inspect_err(|failure| {
            log_error!(
                "[{}] Provider output rejected: {}",
                generation_id,
                failure.kind()
            );
        })?;

        log_info!(
            "[{}] Generated release notes with {} section entries",
            generation_id,
            bundle.sections.len()
        );
        Ok(bundle)
    }
}

fn provider_detail(error: &ProviderError) -> String {
    match error {
        ProviderError::Status { body, .. } => format!("{error}: {body}"),
        other => other.to_string(),
    }
}
