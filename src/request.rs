//! Validation of caller-supplied generation parameters
//!
//! Runs before any external call. `raw` is length-checked exactly as given;
//! trimming is not this layer's job.

use serde_json::{Map, Value};
use std::str::FromStr;

use crate::schema::type_name;
use crate::types::{GenerationRequest, Style};

/// Why a request body was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("request body must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' must be a string, found {found}")]
    NotText {
        field: &'static str,
        found: &'static str,
    },
    #[error("field 'raw' must not be empty")]
    EmptyRaw,
    #[error("unrecognized style '{0}', expected one of: formal, casual")]
    UnknownStyle(String),
}

/// Validate an untyped request body
pub fn validate(input: Value) -> Result<GenerationRequest, RequestError> {
    let mut body = match input {
        Value::Object(map) => map,
        other => return Err(RequestError::NotAnObject(type_name(&other))),
    };

    let raw = take_text(&mut body, "raw")?.ok_or(RequestError::MissingField("raw"))?;
    let style = take_text(&mut body, "style")?
        .map(|s| Style::from_str(&s).map_err(|_| RequestError::UnknownStyle(s)))
        .transpose()?;
    let product_name = take_text(&mut body, "productName")?;
    let version = take_text(&mut body, "version")?;

    let request = GenerationRequest {
        raw,
        style,
        product_name,
        version,
    };
    ensure_valid(&request)?;
    Ok(request)
}

/// Check the invariants a typed request must still satisfy
pub fn ensure_valid(request: &GenerationRequest) -> Result<(), RequestError> {
    if request.raw.is_empty() {
        return Err(RequestError::EmptyRaw);
    }
    Ok(())
}

/// Remove an optional text field. Present-but-not-text (including `null`) is an error.
fn take_text(
    body: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, RequestError> {
    match body.remove(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(RequestError::NotText {
            field,
            found: type_name(&other),
        }),
    }
}
