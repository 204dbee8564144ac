/// Client configuration loaded from environment variables.
///
/// No request timeouts are configured; the transport's defaults apply.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the Skillstack REST API, without a trailing slash.
    pub base_url: String,
}

impl ApiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                         |
    /// |----------------------|---------------------------------|
    /// | `SKILLSTACK_API_URL` | `http://127.0.0.1:8000/mainapp` |
    pub fn from_env() -> Self {
        let base_url = std::env::var("SKILLSTACK_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000/mainapp".into());
        Self::new(base_url)
    }

    /// Build a config for an explicit base URL (trailing slash trimmed).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ApiConfig::new("http://localhost:8000/mainapp/");
        assert_eq!(config.base_url, "http://localhost:8000/mainapp");
    }
}
