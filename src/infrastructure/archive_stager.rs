//! Archive Stager
//!
//! Downloads the compressed database archive into the working area.

use crate::config::ProvisioningConfig;
use crate::domain::errors::{ConfigError, ProvisionError};
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Path of the download endpoint on the provider host.
pub const DOWNLOAD_PATH: &str = "/app/geoip_download";

/// File name of the staged archive inside the working area.
pub const ARCHIVE_FILE_NAME: &str = "GeoLite2.tar.gz";

const USER_AGENT: &str = concat!("geolite-kit/", env!("CARGO_PKG_VERSION"));

/// Streams the remote archive to disk.
pub struct ArchiveStager {
    client: Client,
}

impl ArchiveStager {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build an HTTP client for downloads, honoring the configured timeout.
    pub fn client_for(config: &ProvisioningConfig) -> Result<Client, ProvisionError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.download_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(ProvisionError::network)
    }

    /// Build the download URL for the configured edition.
    pub fn download_url(config: &ProvisioningConfig) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidDownloadUrl {
            url: config.download_base_url.clone(),
            reason,
        };

        let mut url = Url::parse(&config.download_base_url)
            .and_then(|base| base.join(DOWNLOAD_PATH))
            .map_err(|e| invalid(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("edition_id", &config.edition_id)
            .append_pair("license_key", &config.license_key)
            .append_pair("suffix", "tar.gz");

        Ok(url)
    }

    /// Download the archive into `work_dir` and return its path.
    ///
    /// The body is written chunk by chunk as it arrives.
    pub async fn stage(
        &self,
        config: &ProvisioningConfig,
        work_dir: &Path,
    ) -> Result<PathBuf, ProvisionError> {
        let url = Self::download_url(config)?;
        tracing::info!("downloading {}", redact(&url));

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ProvisionError::network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProvisionError::Network(format!(
                "download returned HTTP {}",
                status
            )));
        }

        let archive_path = work_dir.join(ARCHIVE_FILE_NAME);
        let write_err = |e| {
            ProvisionError::filesystem(format!("writing {}", archive_path.display()), e)
        };

        let mut file = tokio::fs::File::create(&archive_path)
            .await
            .map_err(write_err)?;

        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(ProvisionError::network)? {
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;

        tracing::debug!(
            "staged {} bytes at {}",
            written,
            archive_path.display()
        );
        Ok(archive_path)
    }
}

/// Render a URL with the license key masked.
pub fn redact(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "license_key" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();

    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
