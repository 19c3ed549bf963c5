use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{PopSentryError, PopSentryResult};

/// Environment variable naming an explicit config file path.
pub const CONFIG_PATH_ENV: &str = "POPSENTRY_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Settings for the hierarchy URL fetch. Without a timeout the HTTP client default applies.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FetchConfig {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    pub active_provider: String,
    pub providers: HashMap<String, ProviderEntry>,
    /// Role-to-model mapping. If a role is absent, falls back to active_provider defaults.
    #[serde(default)]
    pub roles: RolesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub display_name: String,
    pub api_base: String,
    /// Default model for this provider (used as fallback when no role config exists).
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Literal key. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Name of an environment variable holding the key, read once at load time.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

/// Maps advisor roles to specific provider+model combinations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RolesConfig {
    /// Reads the analyzer's structured output.
    pub hierarchy: Option<RoleEntry>,
    /// Reads a raw screenshot.
    pub vision: Option<RoleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleEntry {
    /// Must match a key under [llm.providers.*].
    pub provider: String,
    /// Model name sent to the API.
    pub model: String,
    /// Overrides the provider-level temperature for this role.
    pub temperature: Option<f64>,
}

fn default_temperature() -> f64 {
    0.0
}

fn default_max_retries() -> u32 {
    2
}

fn resolve_config_path() -> PopSentryResult<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        let candidate = PathBuf::from(explicit);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "config named by {CONFIG_PATH_ENV}");
            return Ok(candidate);
        }
        return Err(PopSentryError::Config(format!(
            "{CONFIG_PATH_ENV} points at {}, which is not a file",
            candidate.display()
        )));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    if let Some(dir) = dirs::config_dir() {
        let candidate = dir.join("popsentry").join("config.toml");
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in user config dir");
            return Ok(candidate);
        }
    }

    Err(PopSentryError::Config(
        "config.toml not found next to executable, in working directory or in user config dir"
            .into(),
    ))
}

pub fn load_config() -> PopSentryResult<AppConfig> {
    let path = resolve_config_path()?;
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> PopSentryResult<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    resolve_api_keys(&mut config);
    tracing::info!(path = %path.display(), provider = %config.llm.active_provider, "config loaded");
    Ok(config)
}

pub fn parse_config(content: &str) -> PopSentryResult<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    if !config.llm.active_provider.is_empty()
        && !config.llm.providers.contains_key(&config.llm.active_provider)
    {
        return Err(PopSentryError::Config(format!(
            "active provider '{}' has no [llm.providers.{}] entry",
            config.llm.active_provider, config.llm.active_provider
        )));
    }
    Ok(config)
}

/// Replace every `api_key_env` reference with the variable's value so the rest of
/// the program only ever sees `api_key`.
pub fn resolve_api_keys(config: &mut AppConfig) {
    for (id, entry) in config.llm.providers.iter_mut() {
        if entry.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
            continue;
        }
        let Some(var) = entry.api_key_env.as_deref() else {
            continue;
        };
        match std::env::var(var) {
            Ok(key) if !key.is_empty() => entry.api_key = Some(key),
            _ => tracing::warn!(provider = %id, env = %var, "API key variable is unset"),
        }
    }
}
