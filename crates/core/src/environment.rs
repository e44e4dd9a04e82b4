//! Environment variable validation and normalization.

use std::collections::BTreeMap;

use crate::error::CoreError;

/// Maximum length of an environment variable key, in characters.
pub const MAX_KEY_LEN: u64 = 255;

/// Key -> value mapping attached to a deployment.
pub type Environment = BTreeMap<String, String>;

/// A key must be non-empty and at most [`MAX_KEY_LEN`] characters.
pub fn validate_key(key: &str) -> Result<(), CoreError> {
    let len = key.chars().count();
    if len == 0 {
        return Err(CoreError::Validation(
            "Environment variable key must not be empty".to_string(),
        ));
    }
    if len as u64 > MAX_KEY_LEN {
        return Err(CoreError::Validation(format!(
            "Environment variable key exceeds {MAX_KEY_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate every key of an environment map.
pub fn validate_environment(env: &Environment) -> Result<(), CoreError> {
    env.keys().try_for_each(|k| validate_key(k))
}

/// Build an environment from editor rows, dropping rows whose key or
/// value is empty. Later duplicates win.
pub fn from_pairs<I, K, V>(pairs: I) -> Environment
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .collect()
}

/// Parse a `KEY=VALUE` assignment. The value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), CoreError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| {
        CoreError::Validation(format!("Expected KEY=VALUE, got '{raw}'"))
    })?;
    validate_key(key)?;
    Ok((key.to_string(), value.to_string()))
}
