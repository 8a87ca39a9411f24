//! Domain Errors
//!
//! Typed failures for configuration, provisioning and lookups.

use std::net::IpAddr;
use std::path::PathBuf;

/// Configuration validation errors.
///
/// These are raised before any network or filesystem work is attempted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("license_key is required")]
    MissingLicenseKey,
    #[error("mmdb destination path is required")]
    MissingDestination,
    #[error("edition_id must not be empty")]
    MissingEditionId,
    #[error("invalid download url {url}: {reason}")]
    InvalidDownloadUrl { url: String, reason: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by a database refresh.
///
/// Every variant is surfaced to the caller of `Provisioner::refresh`
/// after the working area has been removed. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Download request failed or returned a non-success status.
    #[error("network error: {0}")]
    Network(String),

    /// Directory creation, file write or move failed.
    #[error("filesystem error while {context}: {source}")]
    Filesystem {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Archive is corrupt or does not contain the database file.
    #[error("extraction error: {0}")]
    Extraction(String),
}

impl ProvisionError {
    pub fn filesystem(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Filesystem {
            context: context.into(),
            source,
        }
    }

    /// Build a network error from a transport failure.
    ///
    /// The request URL carries the license key, so it is stripped
    /// from the error before it is formatted.
    pub fn network(err: reqwest::Error) -> Self {
        Self::Network(err.without_url().to_string())
    }
}

/// Errors raised by database loading and raw lookups.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Database file missing, unreadable or structurally invalid.
    #[error("invalid database: {0}")]
    InvalidDatabase(String),

    /// Valid database, but the address has no entry.
    #[error("address {0} not found in database")]
    AddressNotFound(IpAddr),

    #[error("invalid IP address: {0:?}")]
    InvalidAddress(String),

    #[error("no database loaded")]
    NotLoaded,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_config_error_wraps_into_provision_error() {
        let err: ProvisionError = ConfigError::MissingLicenseKey.into();
        assert!(matches!(
            err,
            ProvisionError::Configuration(ConfigError::MissingLicenseKey)
        ));
        assert_eq!(
            err.to_string(),
            "configuration error: license_key is required"
        );
    }

    #[test]
    fn test_filesystem_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ProvisionError::filesystem("moving file", io);
        assert_eq!(err.to_string(), "filesystem error while moving file: denied");

        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "denied");
    }

    #[test]
    fn test_lookup_error_display() {
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(
            LookupError::AddressNotFound(ip).to_string(),
            "address 10.0.0.1 not found in database"
        );
        assert_eq!(
            LookupError::InvalidAddress("nope".into()).to_string(),
            "invalid IP address: \"nope\""
        );
        assert_eq!(LookupError::NotLoaded.to_string(), "no database loaded");
    }
}
