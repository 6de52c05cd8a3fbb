//! Recovery of a JSON candidate from raw completion text
//!
//! Models are told to reply with bare JSON but sometimes wrap it in a fenced
//! code block. This strips exactly one enclosing fence and otherwise leaves
//! the text alone; it never inspects the payload itself.

use regex::Regex;
use std::sync::LazyLock;

/// Opening fence with optional language tag, interior, closing fence
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^```[a-zA-Z]*\r?\n([\s\S]*?)\r?\n```$").expect("fence pattern is valid")
});

/// Extract the candidate payload from a raw completion.
///
/// Never fails: anything that is not a single well-formed fenced block is
/// returned trimmed and unchanged, and the parse step reports the problem.
pub fn extract(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    match FENCED_BLOCK.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(interior) => {
            crate::log_debug!(
                "Stripped code fence from completion ({} -> {} chars)",
                trimmed.len(),
                interior.len()
            );
            interior.as_str()
        }
        None => {
            crate::log_debug!("Completion starts with a fence marker but is not a fenced block");
            trimmed
        }
    }
}
