//! Environment variable expansion for configuration strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand `$VAR`, `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the configuration field in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: e.to_string(),
        })
}

/// Expand an optional value; values that expand to an empty string become
/// `None`.
pub(crate) fn expand_optional(
    value: Option<&str>,
    field: &str,
) -> Result<Option<String>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let expanded = expand_env(value, field)?;
    Ok((!expanded.is_empty()).then_some(expanded))
}
