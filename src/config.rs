use std::env;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Read the backend location from the environment, falling back to the
    /// local development server.
    pub fn from_env() -> Self {
        let base_url = env::var("YOUTH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}
