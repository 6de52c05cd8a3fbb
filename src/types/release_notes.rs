//! Release notes bundle types
//!
//! The bundle is the only shape allowed to leave the pipeline. Every field is
//! required; the provider supplies each rendering independently and nothing
//! here derives one from another.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Categorized change lists, in the order the provider listed them
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct Sections {
    /// New user-facing functionality
    pub features: Vec<String>,
    /// Bug fixes
    pub fixes: Vec<String>,
    /// Performance improvements
    pub performance: Vec<String>,
    /// Maintenance, build and dependency work
    pub chores: Vec<String>,
}

impl Sections {
    /// Total number of entries across all four categories
    pub fn len(&self) -> usize {
        self.features.len() + self.fixes.len() + self.performance.len() + self.chores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ready-to-post social media announcements
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct Social {
    /// Short announcement, intended to fit in 280 characters
    pub twitter: String,
    /// Longer announcement, intended to fit in 3000 characters
    pub linkedin: String,
}

/// A validated release notes bundle
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNotesBundle {
    /// Brief one or two sentence summary of the release
    pub summary: String,
    /// Categorized change lists
    pub sections: Sections,
    /// Polished prose version of the release notes
    pub release_notes: String,
    /// Markdown rendering
    pub markdown: String,
    /// HTML rendering
    pub html: String,
    /// Plain text rendering
    pub text: String,
    /// Social media posts
    pub social: Social,
}

/// Which rendering of a bundle to emit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// The whole bundle as pretty-printed JSON
    #[default]
    Json,
    Markdown,
    Html,
    Text,
    /// The prose `releaseNotes` field
    Notes,
    Twitter,
    Linkedin,
}

impl ReleaseNotesBundle {
    /// Select one rendering of the bundle.
    ///
    /// This only picks a field; it never converts between formats.
    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        let rendered = match format {
            OutputFormat::Json => serde_json::to_string_pretty(self)?,
            OutputFormat::Markdown => self.markdown.clone(),
            OutputFormat::Html => self.html.clone(),
            OutputFormat::Text => self.text.clone(),
            OutputFormat::Notes => self.release_notes.clone(),
            OutputFormat::Twitter => self.social.twitter.clone(),
            OutputFormat::Linkedin => self.social.linkedin.clone(),
        };
        Ok(rendered)
    }

    /// JSON Schema describing the bundle contract
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(ReleaseNotesBundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::IntoEnumIterator;

    fn sample() -> ReleaseNotesBundle {
        ReleaseNotesBundle {
            summary: "Parser hardening".to_string(),
            sections: Sections {
                features: vec![],
                fixes: vec!["Fix null pointer in parser".to_string()],
                performance: vec![],
                chores: vec!["Bump serde".to_string()],
            },
            release_notes: "This release hardens the parser.".to_string(),
            markdown: "# Release Notes\n\n## Fixes\n- Fix null pointer in parser".to_string(),
            html: "<h1>Release Notes</h1>".to_string(),
            text: "Release Notes: fixed a null pointer".to_string(),
            social: Social {
                twitter: "Parser fixes are out!".to_string(),
                linkedin: "We shipped parser fixes.".to_string(),
            },
        }
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(sample()).expect("bundle should serialize");
        assert!(value.get("releaseNotes").is_some());
        assert!(value.get("release_notes").is_none());
        assert_eq!(value["sections"]["fixes"], json!(["Fix null pointer in parser"]));
        assert_eq!(value["social"]["twitter"], json!("Parser fixes are out!"));
    }

    #[test]
    fn test_render_selects_fields() {
        let bundle = sample();
        assert_eq!(
            bundle.render(OutputFormat::Markdown).expect("render"),
            bundle.markdown
        );
        assert_eq!(
            bundle.render(OutputFormat::Notes).expect("render"),
            bundle.release_notes
        );
        assert_eq!(
            bundle.render(OutputFormat::Linkedin).expect("render"),
            bundle.social.linkedin
        );

        let json = bundle.render(OutputFormat::Json).expect("render");
        let back: ReleaseNotesBundle = serde_json::from_str(&json).expect("json output parses");
        assert_eq!(back, bundle);
    }

    #[test]
    fn test_output_format_names() {
        let names: Vec<String> = OutputFormat::iter().map(|f| f.to_string()).collect();
        assert_eq!(
            names,
            ["json", "markdown", "html", "text", "notes", "twitter", "linkedin"]
        );
        assert_eq!("html".parse::<OutputFormat>().ok(), Some(OutputFormat::Html));
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_sections_len() {
        assert_eq!(sample().sections.len(), 2);
        assert!(Sections::default().is_empty());
    }

    #[test]
    fn test_json_schema_lists_required_fields() {
        let schema = serde_json::to_value(ReleaseNotesBundle::json_schema())
            .expect("schema should serialize");
        let required: Vec<&str> = schema["required"]
            .as_array()
            .expect("required array")
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        for field in ["summary", "sections", "releaseNotes", "markdown", "html", "text", "social"] {
            assert!(required.contains(&field), "missing {field} in {required:?}");
        }
    }
}
