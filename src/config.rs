//! Configuration
//!
//! `Config` is the raw surface read from the environment or a JSON file.
//! `ProvisioningConfig` is the validated input of a database refresh.

use crate::domain::errors::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_EDITION_ID: &str = "GeoLite2-City";
pub const DEFAULT_DOWNLOAD_URL: &str = "https://download.maxmind.com";
pub const DATABASE_EXTENSION: &str = "mmdb";

const REDACTED: &str = "***";

/// Raw configuration as loaded from the environment or a config file.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub license_key: Option<String>,
    pub edition_id: String,
    /// Destination of the installed database (file or directory)
    pub mmdb: Option<String>,
    pub download_url: String,
    pub work_dir: Option<String>,
    pub download_timeout_secs: Option<u64>,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            license_key: None,
            edition_id: DEFAULT_EDITION_ID.to_string(),
            mmdb: None,
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            work_dir: None,
            download_timeout_secs: None,
            debug: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("license_key", &self.license_key.as_ref().map(|_| REDACTED))
            .field("edition_id", &self.edition_id)
            .field("mmdb", &self.mmdb)
            .field("download_url", &self.download_url)
            .field("work_dir", &self.work_dir)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("debug", &self.debug)
            .finish()
    }
}

impl Config {
    /// Build a config from a variable lookup function.
    ///
    /// Unset and empty variables fall back to defaults.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let download_timeout_secs = var("GEOIP_DOWNLOAD_TIMEOUT_SECS").and_then(|v| v.parse().ok());

        Self {
            license_key: var("GEOIP_LICENSE_KEY"),
            edition_id: var("GEOIP_EDITION_ID").unwrap_or(defaults.edition_id),
            mmdb: var("GEOIP_MMDB"),
            download_url: var("GEOIP_DOWNLOAD_URL").unwrap_or(defaults.download_url),
            work_dir: var("GEOIP_WORK_DIR"),
            download_timeout_secs,
            debug: var("DEBUG").is_some(),
        }
    }

    /// Path of the installed database, if a destination is configured.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.mmdb
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| database_path(Path::new(m), &self.edition_id))
    }

    /// Resolve the provisioning settings, failing on missing required keys.
    pub fn provisioning(&self) -> Result<ProvisioningConfig, ConfigError> {
        let license_key = self
            .license_key
            .clone()
            .ok_or(ConfigError::MissingLicenseKey)?;
        let mmdb = self.mmdb.clone().ok_or(ConfigError::MissingDestination)?;

        let mut config = ProvisioningConfig::new(license_key, mmdb)
            .edition_id(self.edition_id.clone())
            .download_base_url(self.download_url.clone());
        if let Some(dir) = &self.work_dir {
            config = config.work_root(dir);
        }
        if let Some(secs) = self.download_timeout_secs {
            config = config.download_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }
}

/// Resolve where the database for `edition_id` lives under `destination`.
///
/// A destination with the `.mmdb` extension is the file itself; anything
/// else is a directory holding `<edition_id>.mmdb`.
pub fn database_path(destination: &Path, edition_id: &str) -> PathBuf {
    let is_file = destination
        .extension()
        .is_some_and(|ext| ext == DATABASE_EXTENSION);

    if is_file {
        destination.to_path_buf()
    } else {
        destination.join(format!("{}.{}", edition_id, DATABASE_EXTENSION))
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> Config {
    Config::from_vars(|key| std::env::var(key).ok())
}

/// Load configuration from a JSON file.
///
/// Keys mirror the field names: `license_key`, `edition_id`, `mmdb`,
/// `download_url`, `work_dir`, `download_timeout_secs`, `debug`.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Validated input of a database refresh.
#[derive(Clone)]
pub struct ProvisioningConfig {
    /// Provider license key (never logged)
    pub license_key: String,

    /// Database edition to download (default: "GeoLite2-City")
    pub edition_id: String,

    /// Installed database location: a `.mmdb` file path, or a directory
    /// that receives `<edition_id>.mmdb`
    pub destination: PathBuf,

    /// Scheme and host of the download endpoint
    pub download_base_url: String,

    /// Parent of the per-run working area (default: the database's directory)
    pub work_root: Option<PathBuf>,

    /// Overall timeout applied to the download request
    pub download_timeout: Option<Duration>,
}

impl fmt::Debug for ProvisioningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningConfig")
            .field("license_key", &REDACTED)
            .field("edition_id", &self.edition_id)
            .field("destination", &self.destination)
            .field("download_base_url", &self.download_base_url)
            .field("work_root", &self.work_root)
            .field("download_timeout", &self.download_timeout)
            .finish()
    }
}

impl ProvisioningConfig {
    /// Create a configuration with the default edition and endpoint.
    pub fn new(license_key: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            license_key: license_key.into(),
            edition_id: DEFAULT_EDITION_ID.to_string(),
            destination: destination.into(),
            download_base_url: DEFAULT_DOWNLOAD_URL.to_string(),
            work_root: None,
            download_timeout: None,
        }
    }

    /// Set the edition.
    pub fn edition_id(mut self, edition_id: impl Into<String>) -> Self {
        self.edition_id = edition_id.into();
        self
    }

    /// Set the download endpoint.
    pub fn download_base_url(mut self, url: impl Into<String>) -> Self {
        self.download_base_url = url.into();
        self
    }

    /// Set the working area parent directory.
    pub fn work_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_root = Some(dir.into());
        self
    }

    /// Set the download timeout.
    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = Some(timeout);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.license_key.trim().is_empty() {
            return Err(ConfigError::MissingLicenseKey);
        }
        if self.destination.as_os_str().is_empty() {
            return Err(ConfigError::MissingDestination);
        }
        if self.edition_id.trim().is_empty() {
            return Err(ConfigError::MissingEditionId);
        }
        reqwest::Url::parse(&self.download_base_url).map_err(|e| {
            ConfigError::InvalidDownloadUrl {
                url: self.download_base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(())
    }

    /// Final path of the installed database.
    pub fn database_path(&self) -> PathBuf {
        database_path(&self.destination, &self.edition_id)
    }

    /// Directory under which the per-run working area is created.
    ///
    /// Defaults to the database's own directory so the final rename
    /// stays on one filesystem.
    pub fn resolved_work_root(&self) -> PathBuf {
        if let Some(root) = &self.work_root {
            return root.clone();
        }
        match self.database_path().parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
