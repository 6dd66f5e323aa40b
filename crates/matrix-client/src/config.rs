use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8001";
pub const DEFAULT_SESSION_FILE: &str = ".matrix-session.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// `MATRIX_API_URL` and `MATRIX_SESSION_FILE`, with defaults. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("MATRIX_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let session_file = lookup("MATRIX_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.into())
            .into();

        Self {
            api_url,
            session_file,
        }
    }

    /// Command-line values win over the environment.
    pub fn with_overrides(mut self, api_url: Option<String>, session_file: Option<PathBuf>) -> Self {
        if let Some(api_url) = api_url {
            self.api_url = api_url;
        }
        if let Some(session_file) = session_file {
            self.session_file = session_file;
        }
        self
    }
}
