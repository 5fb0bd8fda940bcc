use std::path::PathBuf;

pub const API_BASE_URL_VAR: &str = "LAWYER_AI_API_BASE_URL";
pub const DATABASE_PATH_VAR: &str = "LAWYER_AI_DATABASE_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// `None` keeps the document store in memory.
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = api_base_url.into();
        let trimmed = raw.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(raw));
        }
        Ok(Self {
            api_base_url: trimmed.to_string(),
            database_path: None,
        })
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Reads the process environment, loading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base = lookup(API_BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(API_BASE_URL_VAR))?;
        let mut config = Self::new(base)?;
        if let Some(path) = lookup(DATABASE_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            config = config.with_database_path(path);
        }
        Ok(config)
    }

    pub fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.api_base_url, route)
    }
}
