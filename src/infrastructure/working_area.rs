//! Working Area
//!
//! Private staging directory owned by a single refresh run.

use crate::domain::errors::ProvisionError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const WORK_DIR_PREFIX: &str = ".geoip-";

/// A uniquely named staging directory.
///
/// Every run gets a fresh directory, so overlapping runs never touch
/// each other's files. Call [`WorkingArea::remove`] to delete it and
/// observe failures; dropping it removes it on a best-effort basis.
#[derive(Debug)]
pub struct WorkingArea {
    dir: TempDir,
    /// Directories made for the root, deepest first.
    created: Vec<PathBuf>,
}

impl WorkingArea {
    /// Create a new working area under `root`, creating `root` if needed.
    pub fn create(root: &Path) -> Result<Self, ProvisionError> {
        let created: Vec<PathBuf> = root
            .ancestors()
            .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
            .map(Path::to_path_buf)
            .collect();

        std::fs::create_dir_all(root).map_err(|e| {
            ProvisionError::filesystem(format!("creating {}", root.display()), e)
        })?;

        let dir = tempfile::Builder::new()
            .prefix(WORK_DIR_PREFIX)
            .tempdir_in(root)
            .map_err(|e| {
                ProvisionError::filesystem(
                    format!("creating working area in {}", root.display()),
                    e,
                )
            })?;

        tracing::debug!("working area created at {}", dir.path().display());
        Ok(Self { dir, created })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Recursively delete the working area.
    ///
    /// Directories created for the root are removed too, as long as
    /// they are empty again. A root that now holds the installed
    /// database stays.
    pub fn remove(self) -> std::io::Result<()> {
        let Self { dir, created } = self;
        let path = dir.path().to_path_buf();
        dir.close()?;
        tracing::debug!("working area {} removed", path.display());

        for parent in &created {
            if std::fs::remove_dir(parent).is_err() {
                break;
            }
            tracing::debug!("removed empty directory {}", parent.display());
        }
        Ok(())
    }
}
