//! Configuration types, read from the environment.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Which backend, if any, summarises knowledge-base hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    Gemini,
}

impl LlmBackend {
    /// Parse the `LLM_PROVIDER` value. Empty or unknown means no summariser.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }
}

/// LLM settings, present only when `LLM_PROVIDER` names a known backend.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: SecretString,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// HTTP listen port.
    pub port: u16,
    /// Log inbound message bodies at info level.
    pub debug_messages: bool,
    pub llm: Option<LlmConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("prenatal.db"),
            port: 5000,
            debug_messages: true,
            llm: None,
        }
    }
}

impl AppConfig {
    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = lookup("DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.port,
        };

        let debug_messages = lookup("TWILIO_DEBUG")
            .map(|v| v.trim() == "1")
            .unwrap_or(defaults.debug_messages);

        let llm = match lookup("LLM_PROVIDER").as_deref().and_then(LlmBackend::parse) {
            Some(backend) => {
                let key_var = match backend {
                    LlmBackend::OpenAi => "OPENAI_API_KEY",
                    LlmBackend::Gemini => "GOOGLE_API_KEY",
                };
                let api_key = lookup(key_var)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| ConfigError::MissingEnvVar(key_var.to_string()))?;
                Some(LlmConfig {
                    backend,
                    api_key: SecretString::from(api_key),
                })
            }
            None => None,
        };

        Ok(Self {
            db_path,
            port,
            debug_messages,
            llm,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("prenatal.db"));
        assert_eq!(config.port, 5000);
        assert!(config.debug_messages);
        assert!(config.llm.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DB_PATH", "/tmp/x.db"),
            ("PORT", "8081"),
            ("TWILIO_DEBUG", "0"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.port, 8081);
        assert!(!config.debug_messages);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PORT"));
    }

    #[test]
    fn llm_provider_requires_key() {
        let err = AppConfig::from_lookup(lookup_from(&[("LLM_PROVIDER", "openai")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "OPENAI_API_KEY"));

        let config = AppConfig::from_lookup(lookup_from(&[
            ("LLM_PROVIDER", "Gemini"),
            ("GOOGLE_API_KEY", "g-key"),
        ]))
        .unwrap();
        let llm = config.llm.unwrap();
        assert_eq!(llm.backend, LlmBackend::Gemini);
        assert_eq!(llm.backend.as_str(), "gemini");
    }

    #[test]
    fn unknown_provider_disables_llm() {
        let config = AppConfig::from_lookup(lookup_from(&[("LLM_PROVIDER", "local")])).unwrap();
        assert!(config.llm.is_none());
    }
}
