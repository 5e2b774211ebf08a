//! Environment variable parsing helpers

use crate::error::SettingsError;

/// Get a positive integer limit using the specified variable name and default.
pub(crate) fn get_env_limit<F>(lookup: &F, name: &str, default: usize) -> Result<usize, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let n: i64 = raw
        .trim()
        .parse()
        .map_err(|_| SettingsError::NotInteger(name.to_string()))?;
    if n < 1 {
        return Err(SettingsError::NotPositive(name.to_string()));
    }
    usize::try_from(n).map_err(|_| SettingsError::NotInteger(name.to_string()))
}

/// Get a boolean, falling back to the default when unset or malformed.
pub(crate) fn get_env_bool<F>(lookup: &F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|raw| parse_bool(&raw))
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" => Some(true),
        "0" | "f" | "false" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Get a string, falling back to the default when unset or blank.
pub(crate) fn get_env_string<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
