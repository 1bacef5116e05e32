pub mod bootstrap_config;
pub mod matrix_config;
pub mod store;

use crate::utils::error::{ModelStoreError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Replaces `${VAR}` with the value of the environment variable. Unset
/// variables are left as written.
pub fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_RE.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}

/// Reads a TOML file with environment substitution applied.
pub(crate) fn load_toml<T, P>(path: P, field: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_toml(&content, field)
}

pub(crate) fn parse_toml<T: serde::de::DeserializeOwned>(content: &str, field: &str) -> Result<T> {
    let processed = substitute_env_vars(content);
    toml::from_str(&processed).map_err(|e| ModelStoreError::ConfigValidationError {
        field: field.to_string(),
        message: format!("TOML parsing error: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MODELSTORE_TEST_BUCKET", "my-bucket");
        let out = substitute_env_vars("bucket = \"${MODELSTORE_TEST_BUCKET}\"");
        assert_eq!(out, "bucket = \"my-bucket\"");
        std::env::remove_var("MODELSTORE_TEST_BUCKET");
    }

    #[test]
    fn test_unset_var_is_left_alone() {
        let out = substitute_env_vars("x = \"${MODELSTORE_TEST_SURELY_UNSET}\"");
        assert_eq!(out, "x = \"${MODELSTORE_TEST_SURELY_UNSET}\"");
    }
}
