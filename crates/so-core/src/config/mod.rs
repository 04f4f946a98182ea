//! # Configuration DTO
//!
//! Maps the TOML configuration file onto plain data. No validation and no
//! policy lives here: a missing key becomes an empty string or `None`, and
//! the bootstrap layer decides what that means.

use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `memory` or `rest`, as written. Empty when absent.
    pub provider_backend: String,

    /// Base URL of the hosted provider. Empty when absent.
    pub provider_url: String,

    /// Anonymous API key for the hosted provider. Empty when absent.
    pub provider_anon_key: String,

    /// Table names, as written. Empty when absent.
    pub profiles_table: String,
    pub video_requests_table: String,
    pub celebrities_table: String,

    /// Prefix for generated share links.
    pub share_base_url: String,

    /// Log file override (path info only, no existence check)
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// Empty strings are valid "facts"; this method must not fill in defaults.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let text = |section: &str, key: &str| -> String {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        Ok(Self {
            provider_backend: text("provider", "backend"),
            provider_url: text("provider", "url"),
            provider_anon_key: text("provider", "anon_key"),
            profiles_table: text("tables", "profiles"),
            video_requests_table: text("tables", "video_requests"),
            celebrities_table: text("tables", "celebrities"),
            share_base_url: text("marketplace", "share_base_url"),
            log_file: toml_value
                .get("logging")
                .and_then(|l| l.get("file"))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        })
    }

    /// Create an empty AppConfig (all fields empty)
    pub fn empty() -> Self {
        Self {
            provider_backend: String::new(),
            provider_url: String::new(),
            provider_anon_key: String::new(),
            profiles_table: String::new(),
            video_requests_table: String::new(),
            celebrities_table: String::new(),
            share_base_url: String::new(),
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_from_toml_reads_all_sections() {
        let toml_str = r#"
            [provider]
            backend = "rest"
            url = "https://abc.supabase.co"
            anon_key = "anon"

            [tables]
            profiles = "profiles"
            video_requests = "video_requests"
            celebrities = "celebrities"

            [marketplace]
            share_base_url = "https://shoutout.example"

            [logging]
            file = "/tmp/shoutout.log"
        "#;
        let toml_value: toml::Value = toml::from_str(toml_str).unwrap();
        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.provider_backend, "rest");
        assert_eq!(config.provider_url, "https://abc.supabase.co");
        assert_eq!(config.provider_anon_key, "anon");
        assert_eq!(config.video_requests_table, "video_requests");
        assert_eq!(config.share_base_url, "https://shoutout.example");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/shoutout.log")));
    }

    #[test]
    fn test_app_config_from_empty_toml_keeps_empty_facts() {
        let toml_value: toml::Value = toml::from_str("").unwrap();
        let config = AppConfig::from_toml(&toml_value).unwrap();
        assert_eq!(config, AppConfig::empty());
    }
}
