//! Domain types shared across the pipeline
//!
//! - `GenerationRequest`: what a caller asks for
//! - `ReleaseNotesBundle`: the validated result handed back

mod release_notes;
mod request;

pub use release_notes::{OutputFormat, ReleaseNotesBundle, Sections, Social};
pub use request::{GenerationRequest, Style};
