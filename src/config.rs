use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Secret key shipped for development. Serving warns when it is still in
/// place; real deployments must override it.
pub const DEV_SECRET_KEY: &str = "dev";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Deployment-local directory holding the config file and database.
    pub instance_path: String,

    /// Filesystem path of the SQLite database, or `:memory:`. Defaults to
    /// `blogr.sqlite` inside the instance directory when unset.
    pub database_path: Option<String>,

    pub log_level: String,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            instance_path: "instance".to_string(),
            database_path: None,
            log_level: "info".to_string(),
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    /// Signs the session cookie. The `"dev"` default is for local use only.
    pub secret_key: String,

    /// Whether to set the Secure flag on session cookies. Off by default so
    /// the tutorial setup works over plain HTTP.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            secret_key: DEV_SECRET_KEY.to_string(),
            secure_cookies: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load from the first config file found, or fall back to defaults.
    /// A missing file is not an error; a present-but-unreadable one is.
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));
        paths.push(PathBuf::from("instance").join("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("blogr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".blogr").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.secret_key.is_empty() {
            anyhow::bail!("secret_key cannot be empty");
        }

        if self.general.instance_path.is_empty() {
            anyhow::bail!("instance_path cannot be empty");
        }

        Ok(())
    }

    /// Resolved database location: the configured path, or the default file
    /// inside the instance directory.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.general.database_path.as_ref().map_or_else(
            || Path::new(&self.general.instance_path).join("blogr.sqlite"),
            PathBuf::from,
        )
    }

    #[must_use]
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.database_path().display())
    }

    /// Create the instance directory if it is missing. `create_dir_all`
    /// ignores only the already-exists case; any other filesystem failure
    /// propagates and aborts startup.
    pub fn ensure_instance_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.general.instance_path).with_context(|| {
            format!(
                "Failed to create instance directory: {}",
                self.general.instance_path
            )
        })
    }
}
