//! Environment overlay for chat endpoint and driver settings

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::settings::ClientConfig;
use super::traits::{ConfigError, ConfigResult};

/// Setting name → environment variables, first non-empty wins
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("api_key", vec!["TOOLMUX_API_KEY", "OPENAI_API_KEY"]);
    m.insert("model", vec!["TOOLMUX_MODEL", "OPENAI_MODEL"]);
    m.insert("api_base", vec!["TOOLMUX_BASE_URL", "OPENAI_BASE_URL"]);
    m.insert("max_depth", vec!["TOOLMUX_MAX_DEPTH"]);
    m
});

/// Settings read from the environment
///
/// Values only fill fields the configuration file left unset, except
/// `max_depth` which overrides the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSettings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub max_depth: Option<String>,
}

impl EnvSettings {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |setting: &str| -> Option<String> {
            ENV_VAR_MAP
                .get(setting)?
                .iter()
                .filter_map(|var| lookup(var))
                .find(|v| !v.is_empty())
        };

        Self {
            api_key: get("api_key"),
            model: get("model"),
            api_base: get("api_base"),
            max_depth: get("max_depth"),
        }
    }

    /// Environment variables consulted for a setting
    pub fn vars_for(setting: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(setting).map(|v| v.as_slice())
    }

    /// Merge into `config`
    pub fn apply(&self, config: &mut ClientConfig) -> ConfigResult<()> {
        let chat = &mut config.chat;
        if chat.api_key.is_none() {
            chat.api_key = self.api_key.clone();
        }
        if chat.model.is_none() {
            chat.model = self.model.clone();
        }
        if chat.api_base.is_none() {
            chat.api_base = self.api_base.clone();
        }

        if let Some(raw) = &self.max_depth {
            let depth = raw.trim().parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                field: "TOOLMUX_MAX_DEPTH".to_string(),
                value: raw.clone(),
            })?;
            config.driver.max_depth = depth;
        }

        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_openai_names_are_read() {
        let settings = EnvSettings::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("OPENAI_BASE_URL", "https://llm.internal/v1/"),
        ]));
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(settings.api_base.as_deref(), Some("https://llm.internal/v1/"));
    }

    #[test]
    fn test_toolmux_names_take_precedence() {
        let settings = EnvSettings::from_lookup(lookup(&[
            ("TOOLMUX_MODEL", "local-model"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("TOOLMUX_API_KEY", ""),
            ("OPENAI_API_KEY", "sk-fallback"),
        ]));
        assert_eq!(settings.model.as_deref(), Some("local-model"));
        assert_eq!(settings.api_key.as_deref(), Some("sk-fallback"));
    }

    #[test]
    fn test_apply_only_fills_unset_fields() {
        let mut config = ClientConfig::default();
        config.chat.model = Some("from-file".to_string());

        let settings = EnvSettings::from_lookup(lookup(&[
            ("OPENAI_MODEL", "from-env"),
            ("OPENAI_API_KEY", "sk-env"),
            ("TOOLMUX_MAX_DEPTH", "8"),
        ]));
        settings.apply(&mut config).unwrap();

        assert_eq!(config.chat.model.as_deref(), Some("from-file"));
        assert_eq!(config.chat.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.driver.max_depth, 8);
    }

    #[test]
    fn test_bad_depth_is_rejected() {
        let mut config = ClientConfig::default();
        let settings = EnvSettings::from_lookup(lookup(&[("TOOLMUX_MAX_DEPTH", "deep")]));
        assert!(matches!(
            settings.apply(&mut config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_vars_for() {
        assert_eq!(
            EnvSettings::vars_for("api_key"),
            Some(&["TOOLMUX_API_KEY", "OPENAI_API_KEY"][..])
        );
        assert!(EnvSettings::vars_for("nope").is_none());
    }
}
