use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const ENV_BASE_URL: &str = "TTS_CONSOLE_BASE_URL";

/// Base URL of the remote synthesis/history service.
///
/// Stored without trailing slashes so endpoint paths can be appended
/// unconditionally.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        let trimmed = v.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        let parsed = Url::parse(trimmed)?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self(trimmed.to_owned())),
            other => Err(ConfigError::UnsupportedScheme(other.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a service path onto the base, e.g. `endpoint("tts")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self(DEFAULT_BASE_URL.to_owned())
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub base_url: BaseUrl,
    pub playback: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base url must not be empty")]
    EmptyBaseUrl,
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("base url must use http or https, got {0}")]
    UnsupportedScheme(String),
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// CLI value takes precedence, then the environment, then the fixed default.
pub fn resolve_base_url(
    cli_value: Option<String>,
    env: &impl Env,
) -> Result<BaseUrl, ConfigError> {
    match cli_value {
        Some(v) => BaseUrl::new(v),
        None => match env.var(ENV_BASE_URL) {
            Some(v) => BaseUrl::new(v),
            None => Ok(BaseUrl::default()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_BASE_URL, "http://env.example");
        let url = resolve_base_url(Some("http://cli.example".to_owned()), &env).expect("valid url");
        assert_eq!(url.as_str(), "http://cli.example");
    }

    #[test]
    fn base_url_env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_BASE_URL, "http://env.example");
        let url = resolve_base_url(None, &env).expect("valid url");
        assert_eq!(url.as_str(), "http://env.example");
    }

    #[test]
    fn base_url_default_used_when_both_missing() {
        let env = MapEnv::default();
        let url = resolve_base_url(None, &env).expect("valid url");
        assert_eq!(url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_trailing_slashes_trimmed() {
        let url = BaseUrl::new("http://localhost:5000///").expect("valid url");
        assert_eq!(url.as_str(), "http://localhost:5000");
    }

    #[test]
    fn base_url_rejects_empty_and_whitespace() {
        assert_eq!(BaseUrl::new(""), Err(ConfigError::EmptyBaseUrl));
        assert_eq!(BaseUrl::new("   "), Err(ConfigError::EmptyBaseUrl));
    }

    #[test]
    fn base_url_rejects_non_http_schemes() {
        assert_eq!(
            BaseUrl::new("ftp://files.example"),
            Err(ConfigError::UnsupportedScheme("ftp".to_owned()))
        );
    }

    #[test]
    fn base_url_rejects_unparsable_values() {
        assert!(matches!(
            BaseUrl::new("not a url"),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn endpoint_joins_paths_without_double_slashes() {
        let url = BaseUrl::new("http://localhost:5000/").expect("valid url");
        assert_eq!(url.endpoint("tts"), "http://localhost:5000/tts");
        assert_eq!(url.endpoint("/history"), "http://localhost:5000/history");
    }
}
