//! Environment variables built from an event payload

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::EnvVar;

use crate::error::JobError;

/// Whether `name` is a legal container environment variable name:
/// alphabetic characters, digits, '_', '-', or '.', not starting with a digit.
pub fn is_valid_env_var_name(name: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');

    let mut chars = name.chars();
    match chars.next() {
        Some(first) if allowed(first) && !first.is_ascii_digit() => chars.all(allowed),
        _ => false,
    }
}

/// Turn a payload into one `EnvVar` per key.
///
/// Fails on the first key that is not a legal variable name; no partial list is returned.
pub fn build_env(payload: &BTreeMap<String, String>) -> Result<Vec<EnvVar>, JobError> {
    payload
        .iter()
        .map(|(name, value)| {
            if !is_valid_env_var_name(name) {
                return Err(JobError::InvalidEnvName { key: name.clone() });
            }
            Ok(EnvVar {
                name: name.clone(),
                value: Some(value.clone()),
                ..Default::default()
            })
        })
        .collect()
}
