//! HTTP surface for `relnotes serve`
//!
//! `POST /api/generateNotes` runs one generation per request. The provider
//! credential is resolved per request, so rotating the environment variable
//! does not need a restart.

use crate::config::{Config, ProviderSettings};
use crate::error::{FailureKind, PipelineFailure};
use crate::generator::ReleaseNotesGenerator;
use crate::providers::{CompletionProvider, OpenAiProvider};
use crate::{log_debug, log_info, log_warn};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Where the server obtains the provider API key
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Read the named environment variable on every request
    Env(String),
    /// A fixed value, or none at all
    Fixed(Option<String>),
}

impl CredentialSource {
    fn resolve(&self) -> Option<SecretString> {
        match self {
            Self::Env(var) => std::env::var(var)
                .ok()
                .filter(|key| !key.is_empty())
                .map(SecretString::from),
            Self::Fixed(key) => key
                .as_ref()
                .filter(|key| !key.is_empty())
                .map(|key| SecretString::from(key.clone())),
        }
    }

    /// Caller-facing message when no key is available
    fn missing_message(&self) -> String {
        match self {
            Self::Env(var) => format!("Missing {var}"),
            Self::Fixed(_) => FailureKind::MissingCredential.public_message().to_string(),
        }
    }
}

/// Shared state for the router
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn CompletionProvider>,
    settings: Arc<ProviderSettings>,
    credential: CredentialSource,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        settings: ProviderSettings,
        credential: CredentialSource,
    ) -> Self {
        Self {
            provider,
            settings: Arc::new(settings),
            credential,
        }
    }

    /// State backed by the OpenAI-compatible client and the configured key variable
    pub fn from_settings(settings: ProviderSettings) -> Result<Self> {
        let provider = OpenAiProvider::from_settings(&settings)?;
        let credential = CredentialSource::Env(settings.api_key_env.clone());
        Ok(Self::new(Arc::new(provider), settings, credential))
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generateNotes", post(generate_notes))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[tracing::instrument(name = "generate_notes", skip_all, fields(bytes = body.len()))]
async fn generate_notes(State(state): State<AppState>, body: Bytes) -> Response {
    let input: Value = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(e) => {
            log_info!("Rejected request body that is not JSON: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body");
        }
    };

    let generator = ReleaseNotesGenerator::from_settings(
        &state.settings,
        Arc::clone(&state.provider),
        state.credential.resolve(),
    );

    match generator.generate_from_value(input).await {
        Ok(bundle) => (StatusCode::OK, Json(bundle)).into_response(),
        Err(failure) => failure_response(&failure, &state.credential),
    }
}

fn failure_response(failure: &PipelineFailure, credential: &CredentialSource) -> Response {
    if let Some(detail) = failure.detail() {
        log_debug!("{} detail: {}", failure.kind(), detail);
    }

    let status = status_for(failure.kind());
    match failure.kind() {
        FailureKind::MissingCredential => error_response(status, &credential.missing_message()),
        kind => error_response(status, kind.public_message()),
    }
}

/// HTTP status for a failure kind
pub fn status_for(kind: FailureKind) -> StatusCode {
    if kind.is_caller_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Resolve the socket address from server settings
fn get_socket_addr(config: &Config) -> Result<SocketAddr> {
    let address = format!(
        "{}:{}",
        config.server.listen_address, config.server.port
    );
    address
        .parse()
        .with_context(|| format!("Invalid listen address '{address}'"))
}

/// Run the HTTP service until interrupted
pub async fn serve(config: Config) -> Result<()> {
    let socket_addr = get_socket_addr(&config)?;
    let state = AppState::from_settings(config.provider.clone())?;

    if state.credential.resolve().is_none() {
        log_warn!(
            "{} is not set; generation requests will fail until it is",
            config.provider.api_key_env
        );
    }

    let listener = tokio::net::TcpListener::bind(socket_addr)
        .await
        .with_context(|| format!("Failed to bind {socket_addr}"))?;
    log_info!("Listening on http://{}", socket_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    log_info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log_warn!("Failed to listen for ctrl+c signal: {}", e);
        std::future::pending::<()>().await;
    }
    log_debug!("Interrupt signal received, shutting down");
}
