//! Parse a candidate payload and hold it to the bundle contract

use crate::error::{FailureKind, PipelineFailure};
use crate::schema;
use crate::types::ReleaseNotesBundle;
use crate::{log_debug, log_warn};

/// Parse `candidate` as JSON and validate it against the bundle schema.
///
/// Both failure kinds log the offending text; the returned failure keeps it
/// only as diagnostic detail.
pub fn parse_and_validate(candidate: &str) -> Result<ReleaseNotesBundle, PipelineFailure> {
    let value: serde_json::Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(e) => {
            log_warn!("Completion is not valid JSON ({}). Raw text: {}", e, candidate);
            return Err(PipelineFailure::new(FailureKind::MalformedJson).with_detail(candidate));
        }
    };

    match schema::validate(value) {
        Ok(bundle) => {
            log_debug!(
                "Completion validated: {} section entries, {} chars of markdown",
                bundle.sections.len(),
                bundle.markdown.len()
            );
            Ok(bundle)
        }
        Err(e) => {
            log_warn!("Completion failed schema validation ({}). Raw text: {}", e, candidate);
            Err(PipelineFailure::new(FailureKind::SchemaMismatch)
                .with_detail(format!("{e}\n{candidate}")))
        }
    }
}
