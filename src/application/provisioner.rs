//! Provisioner - Database refresh use case
//!
//! Downloads, extracts and installs a fresh database:
//! 1. Validates the configuration (no I/O on failure)
//! 2. Creates a private working area
//! 3. Stages the archive, unpacks the `.mmdb` entry, installs it
//! 4. Removes the working area, whatever the outcome, along with any
//!    directory made for it that ended up empty

use crate::adapters::outbound::StdoutProgress;
use crate::config::ProvisioningConfig;
use crate::domain::errors::ProvisionError;
use crate::domain::ports::ProgressSink;
use crate::infrastructure::{self, ArchiveExtractor, ArchiveStager, WorkingArea};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Refreshes the installed database.
///
/// Calls to [`Provisioner::refresh`] on one instance are serialized.
/// Separate instances writing the same destination must be serialized
/// by the caller.
pub struct Provisioner {
    client: Option<reqwest::Client>,
    extractor: ArchiveExtractor,
    refresh_lock: Mutex<()>,
}

impl Default for Provisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl Provisioner {
    /// Create a provisioner that builds its HTTP client per refresh,
    /// honoring each config's download timeout.
    pub fn new() -> Self {
        Self {
            client: None,
            extractor: ArchiveExtractor::default(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Create a provisioner that downloads with a caller-supplied client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Some(client),
            ..Self::new()
        }
    }

    /// Download and install the configured database edition.
    ///
    /// Returns the path of the installed database. When `progress` is
    /// `None`, progress is printed to stdout. The working area is gone
    /// by the time this returns, on success and on every error.
    pub async fn refresh(
        &self,
        config: &ProvisioningConfig,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<PathBuf, ProvisionError> {
        config.validate()?;

        let sink: &dyn ProgressSink = match progress {
            Some(sink) => sink,
            None => &StdoutProgress,
        };
        let _guard = self.refresh_lock.lock().await;

        report(sink, "Starting GeoLite2 download...");

        let destination = config.database_path();
        let missing_dir = destination
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty() && !dir.is_dir())
            .map(Path::to_path_buf);

        let work_root = config.resolved_work_root();
        let area = WorkingArea::create(&work_root)?;
        report(
            sink,
            &format!("Creating temporary directory: {}", area.path().display()),
        );
        if let Some(dir) = &missing_dir {
            report(
                sink,
                &format!("Creating destination directory: {}", dir.display()),
            );
        }

        let result = self.run(config, area.path(), sink).await;
        let work_dir = area.path().to_path_buf();

        match (area.remove(), &result) {
            (Ok(()), _) => {}
            (Err(cleanup), Ok(_)) => tracing::warn!(
                "database installed but working area {} could not be removed: {}",
                work_dir.display(),
                cleanup
            ),
            (Err(cleanup), Err(e)) => tracing::warn!(
                "refresh failed ({}) and working area {} could not be removed: {}",
                e,
                work_dir.display(),
                cleanup
            ),
        }

        if result.is_ok() {
            report(sink, "Download complete.");
        }
        result
    }

    async fn run(
        &self,
        config: &ProvisioningConfig,
        work_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<PathBuf, ProvisionError> {
        let client = match &self.client {
            Some(client) => client.clone(),
            None => ArchiveStager::client_for(config)?,
        };

        report(sink, "Downloading ...");
        let archive = ArchiveStager::new(client).stage(config, work_dir).await?;

        report(sink, "Decompressing archive...");
        let extractor = self.extractor.clone();
        let tar_path = blocking(move || extractor.decompress(&archive)).await?;

        let extractor = self.extractor.clone();
        let located = tar_path.clone();
        let entry = blocking(move || extractor.locate(&located)).await?;

        report(sink, "Extracting database file...");
        let extractor = self.extractor.clone();
        let dir = work_dir.to_path_buf();
        let extracted = blocking(move || extractor.unpack(&tar_path, &entry, &dir)).await?;

        let destination = config.database_path();
        report(
            sink,
            &format!("Moving file to: {}", destination.display()),
        );
        let target = destination.clone();
        blocking(move || infrastructure::install(&extracted, &target)).await?;

        Ok(destination)
    }
}

fn report(sink: &dyn ProgressSink, message: &str) {
    tracing::info!("{}", message);
    sink.report(message);
}

async fn blocking<T, F>(f: F) -> Result<T, ProvisionError>
where
    F: FnOnce() -> Result<T, ProvisionError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        ProvisionError::filesystem(
            "running a blocking step",
            std::io::Error::new(std::io::ErrorKind::Other, e),
        )
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ConfigError;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn test_refresh_rejects_missing_license_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let work_root = dir.path().join("work");
        let config = ProvisioningConfig::new("", dir.path().join("GeoLite2-City.mmdb"))
            .work_root(&work_root);

        let result = Provisioner::new().refresh(&config, Some(&|_: &str| {})).await;

        assert!(matches!(
            result,
            Err(ProvisionError::Configuration(ConfigError::MissingLicenseKey))
        ));
        assert!(!work_root.exists());
    }

    #[tokio::test]
    async fn test_refresh_rejects_missing_destination_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let work_root = dir.path().join("work");
        let config = ProvisioningConfig::new("key", "").work_root(&work_root);

        let result = Provisioner::new().refresh(&config, Some(&|_: &str| {})).await;

        assert!(matches!(
            result,
            Err(ProvisionError::Configuration(ConfigError::MissingDestination))
        ));
        assert!(!work_root.exists());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_license_key_never_logged() {
        let dir = tempfile::tempdir().unwrap();
        // nothing listens on port 1
        let config = ProvisioningConfig::new("very-secret-key", dir.path().join("db.mmdb"))
            .download_base_url("http://127.0.0.1:1");

        let result = Provisioner::new().refresh(&config, Some(&|_: &str| {})).await;

        let err = result.unwrap_err();
        assert!(matches!(err, ProvisionError::Network(_)));
        assert!(!err.to_string().contains("very-secret-key"));
        assert!(logs_contain("Downloading"));
        assert!(logs_contain("license_key=***"));
        assert!(!logs_contain("very-secret-key"));
    }

    #[tokio::test]
    async fn test_blocking_maps_panics_to_errors() {
        let result: Result<(), ProvisionError> = blocking(|| panic!("boom")).await;
        assert!(matches!(result, Err(ProvisionError::Filesystem { .. })));
    }
}
