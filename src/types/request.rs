use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Tone hint forwarded to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Style {
    Formal,
    Casual,
}

/// Parameters for a single generation.
///
/// Optional fields stay `None` when the caller did not send them: a present
/// hint changes the instruction sent to the provider, an absent one does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Free-form commit log
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl GenerationRequest {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            style: None,
            product_name: None,
            version: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = Some(product_name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}
