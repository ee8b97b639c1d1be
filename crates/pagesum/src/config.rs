//! Key-value configuration loaded from a dotenv file
//!
//! The file is parsed without touching the process environment. Keys the
//! file does not define fall back to a snapshot of the environment taken at
//! load time.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// OpenAI credential (required)
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Chat-completions API root
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
/// Model identifier override
pub const MODEL: &str = "PAGESUM_MODEL";
/// User-Agent override for page fetches
pub const USER_AGENT: &str = "PAGESUM_USER_AGENT";
/// Request timeout in seconds for page fetches and LLM calls
pub const TIMEOUT_SECS: &str = "PAGESUM_TIMEOUT_SECS";
/// Upper bound on page text embedded in the prompt
pub const MAX_BODY_CHARS: &str = "PAGESUM_MAX_BODY_CHARS";

/// Default env file name
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Read-only setting store
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    /// Load settings from a dotenv file, falling back to the environment
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut values = HashMap::new();

        match dotenvy::from_path_iter(path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    })?;
                    values.insert(key, value);
                }
                tracing::debug!(path = %path.display(), keys = values.len(), "Loaded env file");
            }
            Err(err) if err.not_found() => {
                tracing::debug!(path = %path.display(), "No env file, using process environment");
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        for (key, value) in std::env::vars_os() {
            if let (Ok(key), Ok(value)) = (key.into_string(), value.into_string()) {
                values.entry(key).or_insert(value);
            }
        }

        Ok(Self { values })
    }

    /// Build from explicit pairs, without consulting the environment
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Override a single value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Raw string value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Integer value; fails when present but not an integer
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        self.get(key)
            .map(|value| {
                value.trim().parse().map_err(|_| ConfigError::InvalidInt {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    /// Boolean value: "true", "1" and "yes" (any case) are true, anything else false
    ///
    /// Surrounding whitespace is not ignored, so `" true"` is false.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)
            .map(|value| matches!(value.to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// The OpenAI credential
    pub fn openai_api_key(&self) -> Result<&str, ConfigError> {
        self.get(OPENAI_API_KEY)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                key: OPENAI_API_KEY.to_string(),
            })
    }

    /// Chat-completions API root
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.get(OPENAI_BASE_URL).unwrap_or(DEFAULT_BASE_URL);
        Url::parse(raw).map_err(|_| ConfigError::InvalidUrl {
            key: OPENAI_BASE_URL.to_string(),
            value: raw.to_string(),
        })
    }

    /// Model override, if any
    pub fn model(&self) -> Option<&str> {
        self.get(MODEL).filter(|m| !m.is_empty())
    }

    /// User-Agent override, if any
    pub fn user_agent(&self) -> Option<&str> {
        self.get(USER_AGENT).filter(|ua| !ua.is_empty())
    }

    /// Request timeout, if configured
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        Ok(self
            .get_non_negative(TIMEOUT_SECS)?
            .map(Duration::from_secs))
    }

    /// Prompt body limit in characters, if configured
    pub fn max_body_chars(&self) -> Result<Option<usize>, ConfigError> {
        self.get_non_negative(MAX_BODY_CHARS)?
            .map(|n| {
                usize::try_from(n).map_err(|_| ConfigError::InvalidInt {
                    key: MAX_BODY_CHARS.to_string(),
                    value: n.to_string(),
                })
            })
            .transpose()
    }

    fn get_non_negative(&self, key: &str) -> Result<Option<u64>, ConfigError> {
        match self.get_int(key)? {
            Some(n) => u64::try_from(n).map(Some).map_err(|_| ConfigError::InvalidInt {
                key: key.to_string(),
                value: n.to_string(),
            }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_env_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_get_missing_is_none() {
        let config = Config::from_pairs([("A", "1")]);
        assert_eq!(config.get("A"), Some("1"));
        assert_eq!(config.get("B"), None);
        assert_eq!(config.get_int("B").unwrap(), None);
        assert_eq!(config.get_bool("B"), None);
    }

    #[test]
    fn test_get_int() {
        let config = Config::from_pairs([("N", "42"), ("NEG", "-3"), ("BAD", "ten")]);
        assert_eq!(config.get_int("N").unwrap(), Some(42));
        assert_eq!(config.get_int("NEG").unwrap(), Some(-3));
        assert!(matches!(
            config.get_int("BAD"),
            Err(ConfigError::InvalidInt { ref key, ref value }) if key == "BAD" && value == "ten"
        ));
    }

    #[test]
    fn test_get_bool() {
        let config = Config::from_pairs([
            ("T1", "true"),
            ("T2", "YES"),
            ("T3", "1"),
            ("F1", "false"),
            ("F2", "0"),
            ("F3", "maybe"),
        ]);
        assert_eq!(config.get_bool("T1"), Some(true));
        assert_eq!(config.get_bool("T2"), Some(true));
        assert_eq!(config.get_bool("T3"), Some(true));
        assert_eq!(config.get_bool("F1"), Some(false));
        assert_eq!(config.get_bool("F2"), Some(false));
        assert_eq!(config.get_bool("F3"), Some(false));
    }

    #[test]
    fn test_get_bool_does_not_trim() {
        let config = Config::from_pairs([("PADDED", " true"), ("TRAILING", "yes\t")]);
        assert_eq!(config.get_bool("PADDED"), Some(false));
        assert_eq!(config.get_bool("TRAILING"), Some(false));
    }

    #[test]
    fn test_openai_api_key_required() {
        let config = Config::from_pairs([(OPENAI_API_KEY, "sk-test")]);
        assert_eq!(config.openai_api_key().unwrap(), "sk-test");

        let config = Config::from_pairs([(OPENAI_API_KEY, "  ")]);
        assert!(matches!(
            config.openai_api_key(),
            Err(ConfigError::Missing { .. })
        ));

        let config = Config::default();
        assert!(matches!(
            config.openai_api_key(),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_typed_settings() {
        let config = Config::from_pairs([
            (TIMEOUT_SECS, "15"),
            (MAX_BODY_CHARS, "2000"),
            (MODEL, "gpt-4o"),
        ]);
        assert_eq!(config.timeout().unwrap(), Some(Duration::from_secs(15)));
        assert_eq!(config.max_body_chars().unwrap(), Some(2000));
        assert_eq!(config.model(), Some("gpt-4o"));
        assert_eq!(config.base_url().unwrap().as_str(), "https://api.openai.com/v1");

        let config = Config::from_pairs([(MAX_BODY_CHARS, "-1")]);
        assert!(config.max_body_chars().is_err());

        let config = Config::from_pairs([(OPENAI_BASE_URL, "not a url")]);
        assert!(matches!(
            config.base_url(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_load_env_file() {
        let file =
            temp_env_file("# comment\nPAGESUM_TEST_ONLY_KEY=from-file\nPAGESUM_TEST_NUM=7\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.get("PAGESUM_TEST_ONLY_KEY"), Some("from-file"));
        assert_eq!(config.get_int("PAGESUM_TEST_NUM").unwrap(), Some(7));
        // Loading must not leak into the process environment
        assert!(std::env::var("PAGESUM_TEST_ONLY_KEY").is_err());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let file = temp_env_file("PAGESUM_TEST_GOOD=1\nNOT A VALID LINE\n");
        match Config::load(file.path()) {
            Err(ConfigError::Read { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected read error, got {:?}", other),
        }
    }


    #[test]
    fn test_load_missing_file_is_empty_layer() {
        let config = Config::load("/nonexistent/pagesum/.env").unwrap();
        assert_eq!(config.get("PAGESUM_TEST_NEVER_SET"), None);
    }
}
