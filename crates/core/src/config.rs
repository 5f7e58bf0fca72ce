use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;
use serde::Deserialize;

static DEFAULT_CONFIG_NAME: &str = ".wutrc";
static ENV_CONFIG_PATH: &str = "WUT_CONFIG_PATH";
static DEFAULT_API_BASE_URL: &str = "https://a.wunderlist.com/api";
static DEFAULT_API_VERSION: u32 = 1;
static DEFAULT_TIMEOUT_SECS: u64 = 30;

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("name", "dwf", "wut"));

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    client_id: Option<String>,
    #[serde(alias = "oauth_token", alias = "token")]
    access_token: Option<String>,
    api_base_url: Option<String>,
    api_version: Option<u32>,
    which_list: Option<String>,
    inbox_first: Option<bool>,
    use_positions: Option<bool>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    config_path: Option<PathBuf>,
    client_id: String,
    access_token: String,
    api_base_url: String,
    api_version: u32,
    which_list: Option<String>,
    inbox_first: bool,
    use_positions: bool,
    request_timeout_secs: u64,
}

impl AppConfig {
    /// Construct [`AppConfig`] by resolving the config file from the provided override,
    /// the `WUT_CONFIG_PATH` environment variable, or `~/.wutrc`.
    pub fn discover(config_override: Option<PathBuf>) -> Result<Self> {
        let path = resolve_config_path(config_override, env::var(ENV_CONFIG_PATH).ok())?;
        Self::load(&path)
    }

    /// Load and validate the YAML config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        let mut config = Self::from_yaml_str(&raw)
            .with_context(|| format!("Invalid config file at {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let parsed: RawConfig = if raw.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(raw).context("Failed to parse YAML")?
        };

        let client_id = required(parsed.client_id, "client_id")?;
        let access_token = required(parsed.access_token, "access_token")?;

        Ok(Self {
            config_path: None,
            client_id,
            access_token,
            api_base_url: parsed
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_version: parsed.api_version.unwrap_or(DEFAULT_API_VERSION),
            which_list: parsed.which_list.filter(|title| !title.trim().is_empty()),
            inbox_first: parsed.inbox_first.unwrap_or(true),
            use_positions: parsed.use_positions.unwrap_or(true),
            request_timeout_secs: parsed.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Construct [`AppConfig`] directly from credentials, with defaults for everything else.
    pub fn with_credentials<C: Into<String>, T: Into<String>>(client_id: C, token: T) -> Self {
        Self {
            config_path: None,
            client_id: client_id.into(),
            access_token: token.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION,
            which_list: None,
            inbox_first: true,
            use_positions: true,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    pub fn which_list(&self) -> Option<&str> {
        self.which_list.as_deref()
    }

    pub fn inbox_first(&self) -> bool {
        self.inbox_first
    }

    pub fn use_positions(&self) -> bool {
        self.use_positions
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }
}

/// Directory for the log file: the platform data dir, else `~/.wut`.
pub fn default_log_dir() -> PathBuf {
    if let Some(project) = &*PROJECT_DIRS {
        return project.data_local_dir().to_path_buf();
    }
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".wut");
    }
    env::temp_dir().join("wut")
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(anyhow!("missing required setting `{}`", key)),
    }
}

fn resolve_config_path(
    config_override: Option<PathBuf>,
    env_path: Option<String>,
) -> Result<PathBuf> {
    if let Some(path) = config_override {
        return Ok(path);
    }

    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(DEFAULT_CONFIG_NAME));
    }

    Err(anyhow!(
        "Could not locate a home directory; pass --config or set {}",
        ENV_CONFIG_PATH
    ))
}
