//! Code-generation request defaults and bounds.

/// Model used when the caller does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Sampling temperature used when the caller does not pass one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Token budget used when the caller does not pass one.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;
pub const MAX_TOKENS_LIMIT: u32 = 32_000;

/// Fully resolved generation parameters handed to the engine.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerationParams {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationParams {
    /// Fill in defaults for any parameter the caller omitted.
    pub fn resolve(
        prompt: String,
        model: Option<String>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            prompt,
            model: model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}
