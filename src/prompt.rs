use crate::types::GenerationRequest;

/// Fixed instruction stating the exact shape the provider must return
pub fn create_system_prompt() -> String {
    String::from(
        "You are a release notes generator. Return ONLY valid JSON matching this exact structure:

{
  \"summary\": \"Brief 1-2 sentence summary of the release\",
  \"sections\": {
    \"features\": [\"New feature 1\", \"New feature 2\"],
    \"fixes\": [\"Bug fix 1\", \"Bug fix 2\"],
    \"performance\": [\"Performance improvement 1\"],
    \"chores\": [\"Maintenance task 1\"]
  },
  \"releaseNotes\": \"Polished prose version of the release notes\",
  \"markdown\": \"# Release Notes\\n\\n## Features\\n- Feature 1\\n- Feature 2\",
  \"html\": \"<h1>Release Notes</h1><h2>Features</h2><ul><li>Feature 1</li></ul>\",
  \"text\": \"Plain text version of release notes\",
  \"social\": {
    \"twitter\": \"Tweet about the release (max 280 chars)\",
    \"linkedin\": \"LinkedIn post about the release (max 3000 chars)\"
  }
}

Every field is required. Use an empty array for a category with no entries.
Keep the order of changes as they appear in the commits.
Do not include any markdown formatting, code fences, or extra text. Only return the JSON object.",
    )
}

/// Commit log followed by one line per hint the caller actually supplied
pub fn create_user_prompt(request: &GenerationRequest) -> String {
    let mut lines = vec![format!("Raw commits:\n{}", request.raw)];

    if let Some(style) = request.style {
        lines.push(format!("Tone: {style}"));
    }
    if let Some(product) = non_empty(request.product_name.as_deref()) {
        lines.push(format!("Product: {product}"));
    }
    if let Some(version) = non_empty(request.version.as_deref()) {
        lines.push(format!("Version: {version}"));
    }

    lines.join("\n")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
