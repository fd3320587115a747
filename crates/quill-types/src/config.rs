//! Global configuration types for Quill.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls
//! the bind address, generation model, and context window sizing.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Quill relay.
///
/// Loaded from `~/.quill/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Generation backend model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Turns fetched per history request when the caller gives no limit.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_history_limit() -> u32 {
    20
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            model: default_model(),
            history_limit: default_history_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.history_limit, 20);
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
bind_addr = "0.0.0.0:9000"
model = "gemini-1.5-pro"
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.history_limit, 20);
    }
}
