/// Read an environment variable, preferring the `TRACKER_` prefixed form.
///
/// `get_env_with_prefix("PORT")` checks `TRACKER_PORT` first and falls back
/// to plain `PORT`, so the service runs unchanged on hosts that only inject
/// unprefixed variables.
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("TRACKER_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Read and parse an environment variable, ignoring values that fail to parse.
pub fn parse_env_with_prefix<T: std::str::FromStr>(key: &str) -> Option<T> {
    get_env_with_prefix(key).and_then(|value| value.trim().parse().ok())
}
