//! Application configuration loading from config.toml
//!
//! Every field has a default, so a missing file (or a file that only sets a
//! few keys) yields a working configuration. A file that exists but cannot be
//! parsed is an error.

use crate::core::{access::Capability, gate::RequestKind};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Site identity and landing page hooks
    pub site: SiteConfig,
    /// Gate policy knobs
    pub gate: GateConfig,
    /// Listener settings for the binary
    pub server: ServerConfig,
}

/// Site identity used by the landing page layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Shown as the landing page `<title>`
    pub name: String,
    /// Value of the `lang` attribute on `<html>`
    pub language: String,
    /// Declared document charset
    pub charset: String,
    /// Optional stylesheet linked from the landing page head
    pub stylesheet: Option<String>,
    /// Raw HTML fragments emitted at the end of `<head>`
    pub head_html: Vec<String>,
    /// Raw HTML fragments emitted at the end of `<body>`
    pub footer_html: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "My Site".to_string(),
            language: "en-US".to_string(),
            charset: "UTF-8".to_string(),
            stylesheet: None,
            head_html: Vec::new(),
            footer_html: Vec::new(),
        }
    }
}

/// Gate policy configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Paths under this prefix are API requests
    pub api_prefix: String,
    /// Paths under this prefix are admin screens and never gated
    pub admin_prefix: String,
    /// Status used to reject anonymous API calls during maintenance
    pub api_block_status: u16,
    /// Capability required to view or save the settings form
    pub settings_capability: Capability,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            admin_prefix: "/admin".to_string(),
            api_block_status: 503,
            settings_capability: Capability::EditOthersContent,
        }
    }
}

impl GateConfig {
    /// Checks the values the router and the gate rely on.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if:
    /// - `admin_prefix` is empty, `/`, or does not start with `/`
    /// - `api_prefix` is empty or does not start with `/`
    /// - `api_block_status` is not a 4xx or 5xx status code
    pub fn validate(&self) -> Result<()> {
        let admin = self.admin_prefix.trim_end_matches('/');
        if admin.is_empty() || !admin.starts_with('/') {
            return Err(Error::Config {
                message: format!(
                    "gate.admin_prefix must be a path below the site root, got {:?}",
                    self.admin_prefix
                ),
            });
        }
        if !self.api_prefix.starts_with('/') {
            return Err(Error::Config {
                message: format!("gate.api_prefix must start with '/', got {:?}", self.api_prefix),
            });
        }
        if !(400..=599).contains(&self.api_block_status) {
            return Err(Error::Config {
                message: format!(
                    "gate.api_block_status must be a 4xx or 5xx status, got {}",
                    self.api_block_status
                ),
            });
        }
        Ok(())
    }

    /// Classifies a request path as admin, API or ordinary page.
    #[must_use]
    pub fn classify(&self, path: &str) -> RequestKind {
        if under_prefix(path, &self.admin_prefix) {
            RequestKind::Admin
        } else if under_prefix(path, &self.api_prefix) {
            RequestKind::Api
        } else {
            RequestKind::Page
        }
    }

    /// Builds an absolute admin URL from a path relative to the admin prefix.
    #[must_use]
    pub fn admin_url(&self, path: &str) -> String {
        format!("{}/{}", self.admin_prefix.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

fn under_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Listener settings for the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind: String,
    /// Directory of static files served as the gated site
    pub public_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            public_dir: "public".to_string(),
        }
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The gate section fails [`GateConfig::validate`]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents).map_err(|e| Error::Config {
        message: format!("{}: {e}", path_ref.display()),
    })
}

fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse configuration: {e}"),
    })?;
    config.gate.validate()?;
    Ok(config)
}

/// Loads the configuration named by `GATE_CONFIG` (default `./config.toml`).
///
/// A missing file falls back to the built-in defaults.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("GATE_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        info!("No configuration file at {}, using defaults", path);
        return Ok(AppConfig::default());
    }
    let config = load_config(&path)?;
    info!("Loaded configuration from {}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
            [site]
            name = "Acme"
            footer_html = ["<script src=\"/a.js\"></script>"]

            [gate]
            api_block_status = 403
            settings_capability = "manage_options"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.site.name, "Acme");
        assert_eq!(config.site.charset, "UTF-8");
        assert_eq!(config.site.footer_html.len(), 1);
        assert_eq!(config.gate.api_block_status, 403);
        assert_eq!(config.gate.settings_capability, Capability::ManageOptions);
        assert_eq!(config.gate.api_prefix, "/api");
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.gate.api_block_status, 503);
        assert_eq!(config.gate.settings_capability, Capability::EditOthersContent);
        assert!(config.site.stylesheet.is_none());
    }

    #[test]
    fn test_classify_paths() {
        let gate = GateConfig::default();
        assert_eq!(gate.classify("/"), RequestKind::Page);
        assert_eq!(gate.classify("/about"), RequestKind::Page);
        assert_eq!(gate.classify("/api"), RequestKind::Api);
        assert_eq!(gate.classify("/api/ping"), RequestKind::Api);
        assert_eq!(gate.classify("/apiary"), RequestKind::Page);
        assert_eq!(gate.classify("/admin/settings"), RequestKind::Admin);
        assert_eq!(gate.classify("/administrator"), RequestKind::Page);
    }

    #[test]
    fn test_admin_url() {
        let gate = GateConfig::default();
        assert_eq!(gate.admin_url("settings"), "/admin/settings");
        assert_eq!(gate.admin_url("/status"), "/admin/status");
    }

    #[test]
    fn test_rejects_unusable_api_block_status() {
        for status in [42, 200, 302, 600] {
            let toml_str = format!("[gate]\napi_block_status = {status}\n");
            let result = parse_config(&toml_str);
            assert!(matches!(result, Err(Error::Config { .. })), "{status}");
        }
        let config = parse_config("[gate]\napi_block_status = 451\n").unwrap();
        assert_eq!(config.gate.api_block_status, 451);
    }

    #[test]
    fn test_rejects_root_admin_prefix() {
        for prefix in ["", "/", "//", "admin"] {
            let toml_str = format!("[gate]\nadmin_prefix = {prefix:?}\n");
            let result = parse_config(&toml_str);
            assert!(matches!(result, Err(Error::Config { .. })), "{prefix:?}");
        }
        assert!(GateConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
