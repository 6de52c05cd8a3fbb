//! Structural validation of untrusted JSON against the bundle contract
//!
//! Unlike a plain `serde_json::from_value`, this walks the value by hand so a
//! rejection names the exact path and the type that was found there. Unknown
//! fields anywhere in the tree are ignored; every known field must be present
//! with the right shape. Nothing is coerced or defaulted.

use serde_json::{Map, Value};

use crate::types::{ReleaseNotesBundle, Sections, Social};

/// Why a candidate value is not a valid bundle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required field '{path}'")]
    MissingField { path: String },
    #[error("expected {expected} at '{path}', found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl SchemaError {
    /// JSON path of the offending field (`$` for the root)
    pub fn path(&self) -> &str {
        match self {
            Self::MissingField { path } | Self::WrongType { path, .. } => path,
        }
    }
}

/// Validate a parsed candidate and convert it into a bundle
pub fn validate(candidate: Value) -> Result<ReleaseNotesBundle, SchemaError> {
    let mut root = into_object(candidate, "$")?;

    let summary = take_string(&mut root, "", "summary")?;
    let sections = take_sections(&mut root)?;
    let release_notes = take_string(&mut root, "", "releaseNotes")?;
    let markdown = take_string(&mut root, "", "markdown")?;
    let html = take_string(&mut root, "", "html")?;
    let text = take_string(&mut root, "", "text")?;
    let social = take_social(&mut root)?;

    Ok(ReleaseNotesBundle {
        summary,
        sections,
        release_notes,
        markdown,
        html,
        text,
        social,
    })
}

fn take_sections(root: &mut Map<String, Value>) -> Result<Sections, SchemaError> {
    let mut sections = into_object(take(root, "", "sections")?, "sections")?;
    Ok(Sections {
        features: take_string_list(&mut sections, "sections", "features")?,
        fixes: take_string_list(&mut sections, "sections", "fixes")?,
        performance: take_string_list(&mut sections, "sections", "performance")?,
        chores: take_string_list(&mut sections, "sections", "chores")?,
    })
}

fn take_social(root: &mut Map<String, Value>) -> Result<Social, SchemaError> {
    let mut social = into_object(take(root, "", "social")?, "social")?;
    Ok(Social {
        twitter: take_string(&mut social, "social", "twitter")?,
        linkedin: take_string(&mut social, "social", "linkedin")?,
    })
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn take(obj: &mut Map<String, Value>, parent: &str, name: &str) -> Result<Value, SchemaError> {
    obj.remove(name).ok_or_else(|| SchemaError::MissingField {
        path: join(parent, name),
    })
}

fn into_object(value: Value, path: &str) -> Result<Map<String, Value>, SchemaError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SchemaError::WrongType {
            path: path.to_string(),
            expected: "object",
            found: type_name(&other),
        }),
    }
}

fn take_string(
    obj: &mut Map<String, Value>,
    parent: &str,
    name: &str,
) -> Result<String, SchemaError> {
    match take(obj, parent, name)? {
        Value::String(s) => Ok(s),
        other => Err(SchemaError::WrongType {
            path: join(parent, name),
            expected: "string",
            found: type_name(&other),
        }),
    }
}

fn take_string_list(
    obj: &mut Map<String, Value>,
    parent: &str,
    name: &str,
) -> Result<Vec<String>, SchemaError> {
    let path = join(parent, name);
    let items = match take(obj, parent, name)? {
        Value::Array(items) => items,
        other => {
            return Err(SchemaError::WrongType {
                path,
                expected: "array of strings",
                found: type_name(&other),
            });
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(s),
            other => Err(SchemaError::WrongType {
                path: format!("{path}[{index}]"),
                expected: "string",
                found: type_name(&other),
            }),
        })
        .collect()
}

/// Human-readable type name for a JSON value
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_candidate() -> Value {
        json!({
            "summary": "Parser fixes",
            "sections": {
                "features": [],
                "fixes": ["Fix null pointer in parser", "Fix off-by-one in lexer"],
                "performance": ["Cache token table"],
                "chores": []
            },
            "releaseNotes": "This release fixes two parser bugs.",
            "markdown": "# Release Notes\n\n## Fixes\n- Fix null pointer in parser",
            "html": "<h1>Release Notes</h1><ul><li>Fix null pointer in parser</li></ul>",
            "text": "Release Notes\nFixes: null pointer in parser",
            "social": {
                "twitter": "Parser fixes shipped",
                "linkedin": "We just shipped parser fixes."
            }
        })
    }

    #[test]
    fn test_valid_candidate_produces_equal_bundle() {
        let bundle = validate(valid_candidate()).expect("candidate should validate");
        assert_eq!(bundle.summary, "Parser fixes");
        assert_eq!(
            bundle.sections.fixes,
            vec!["Fix null pointer in parser", "Fix off-by-one in lexer"]
        );
        assert_eq!(bundle.sections.performance, vec!["Cache token table"]);
        assert!(bundle.sections.features.is_empty());
        assert_eq!(bundle.social.linkedin, "We just shipped parser fixes.");

        // Serializing back yields the same document
        let round = serde_json::to_value(&bundle).expect("bundle should serialize");
        assert_eq!(round, valid_candidate());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let mut candidate = valid_candidate();
        candidate["highlights"] = json!(["extra"]);
        candidate["sections"]["security"] = json!(["CVE fix"]);
        candidate["social"]["mastodon"] = json!("toot");
        let bundle = validate(candidate).expect("extras should be ignored");
        assert_eq!(bundle, validate(valid_candidate()).expect("baseline"));
    }

    #[test]
    fn test_rejects_non_object_root() {
        for candidate in [json!([]), json!("notes"), json!(42), json!(null)] {
            let err = validate(candidate).expect_err("non-object root must fail");
            assert_eq!(err.path(), "$");
        }
    }

    #[test]
    fn test_rejects_each_missing_top_level_field() {
        for field in [
            "summary",
            "sections",
            "releaseNotes",
            "markdown",
            "html",
            "text",
            "social",
        ] {
            let mut candidate = valid_candidate();
            candidate
                .as_object_mut()
                .expect("object")
                .remove(field);
            let err = validate(candidate).expect_err("missing field must fail");
            assert_eq!(
                err,
                SchemaError::MissingField {
                    path: field.to_string()
                }
            );
        }
    }

    #[test]
    fn test_rejects_missing_nested_fields() {
        let mut candidate = valid_candidate();
        candidate["sections"]
            .as_object_mut()
            .expect("object")
            .remove("chores");
        assert_eq!(
            validate(candidate).expect_err("must fail").path(),
            "sections.chores"
        );

        let mut candidate = valid_candidate();
        candidate["social"]
            .as_object_mut()
            .expect("object")
            .remove("twitter");
        assert_eq!(
            validate(candidate).expect_err("must fail").path(),
            "social.twitter"
        );
    }

    #[test]
    fn test_rejects_section_given_as_text() {
        let mut candidate = valid_candidate();
        candidate["sections"]["fixes"] = json!("Fix null pointer in parser");
        assert_eq!(
            validate(candidate).expect_err("must fail"),
            SchemaError::WrongType {
                path: "sections.fixes".to_string(),
                expected: "array of strings",
                found: "string",
            }
        );
    }

    #[test]
    fn test_rejects_non_string_section_entry() {
        let mut candidate = valid_candidate();
        candidate["sections"]["fixes"] = json!(["ok", {"description": "nested"}]);
        let err = validate(candidate).expect_err("must fail");
        assert_eq!(err.path(), "sections.fixes[1]");
        assert!(err.to_string().contains("found object"));
    }

    #[test]
    fn test_rejects_null_and_number_fields() {
        let mut candidate = valid_candidate();
        candidate["summary"] = Value::Null;
        assert!(matches!(
            validate(candidate),
            Err(SchemaError::WrongType { found: "null", .. })
        ));

        let mut candidate = valid_candidate();
        candidate["social"]["linkedin"] = json!(3000);
        assert!(matches!(
            validate(candidate),
            Err(SchemaError::WrongType { found: "number", .. })
        ));

        let mut candidate = valid_candidate();
        candidate["social"] = json!(["twitter", "linkedin"]);
        assert_eq!(validate(candidate).expect_err("must fail").path(), "social");
    }
}
