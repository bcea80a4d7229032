/// Get environment variable with ORGPASS_ prefix, falling back to unprefixed version
///
/// Checks `ORGPASS_{key}` first, then `{key}`, so deployments can either
/// namespace their settings or reuse conventional names like `JWT_SECRET`.
///
/// # Examples
///
/// ```rust,ignore
/// // Checks ORGPASS_JWT_SECRET first, then JWT_SECRET
/// let secret = get_env_with_prefix("JWT_SECRET");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("ORGPASS_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// First variable from `keys` that is set, using [`get_env_with_prefix`] for each.
pub fn first_env_with_prefix(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| get_env_with_prefix(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("ORGPASS_ENV_TEST_VAR", "prefixed_value");
            std::env::set_var("ENV_TEST_VAR", "unprefixed_value");
        }
        assert_eq!(
            get_env_with_prefix("ENV_TEST_VAR"),
            Some("prefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("ORGPASS_ENV_TEST_VAR");
        }

        // Unprefixed fallback
        assert_eq!(
            get_env_with_prefix("ENV_TEST_VAR"),
            Some("unprefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("ENV_TEST_VAR");
        }

        assert_eq!(get_env_with_prefix("ENV_TEST_NON_EXISTENT"), None);
    }

    #[test]
    fn test_first_env_with_prefix() {
        unsafe {
            std::env::set_var("ENV_TEST_SECOND_KEY", "second");
        }
        assert_eq!(
            first_env_with_prefix(&["ENV_TEST_FIRST_KEY", "ENV_TEST_SECOND_KEY"]),
            Some("second".to_string())
        );
        unsafe {
            std::env::remove_var("ENV_TEST_SECOND_KEY");
        }
        assert_eq!(first_env_with_prefix(&["ENV_TEST_FIRST_KEY"]), None);
    }
}
