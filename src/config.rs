use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the SEC identity ("Name email@example.com")
pub const IDENTITY_ENV: &str = "EDGAR_IDENTITY";

/// Identity sent when none is configured. The SEC may throttle it.
pub const FALLBACK_IDENTITY: &str = "edgar-explorer edgar-explorer@example.com";

pub const DEFAULT_DATABASE: &str = "edgar_cache.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_FILINGS_TTL_SECS: u64 = 3600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExplorerConfig {
    pub identity: Option<String>,
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
    pub filings_ttl_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl ExplorerConfig {
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(self.database.as_deref().unwrap_or(DEFAULT_DATABASE))
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn static_dir(&self) -> PathBuf {
        PathBuf::from(self.static_dir.as_deref().unwrap_or(DEFAULT_STATIC_DIR))
    }

    pub fn filings_ttl(&self) -> Duration {
        Duration::from_secs(self.filings_ttl_secs.unwrap_or(DEFAULT_FILINGS_TTL_SECS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("edgar-explorer.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ExplorerConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ExplorerConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

/// Pick the identity: environment first, then the config file.
/// Blank values count as unset.
pub fn resolve_identity(env: Option<String>, file: Option<&str>) -> Option<String> {
    env.filter(|v| !v.trim().is_empty())
        .or_else(|| file.filter(|v| !v.trim().is_empty()).map(str::to_string))
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
