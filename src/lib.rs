//! relnotes - AI-assisted release notes
//!
//! Turns a raw commit log into a validated `ReleaseNotesBundle` by asking a
//! chat-completion model for structured JSON and checking the reply against
//! the bundle contract before anything reaches the caller.

// Allow certain clippy warnings that are stylistic
#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod logger;
pub mod prompt;
pub mod providers;
pub mod request;
pub mod schema;
pub mod server;
pub mod types;
pub mod ui;
pub mod validator;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use error::{FailureKind, PipelineFailure};
pub use generator::ReleaseNotesGenerator;
pub use providers::{CompletionProvider, CompletionRequest, OpenAiProvider, ProviderError};

// Re-exports from types module
pub use types::{GenerationRequest, OutputFormat, ReleaseNotesBundle, Sections, Social, Style};
