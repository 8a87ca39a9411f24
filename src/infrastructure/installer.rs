//! Installer
//!
//! Moves an extracted database onto its final path.

use crate::domain::errors::ProvisionError;
use std::path::Path;

/// Place `extracted` at `destination`, replacing any previous file.
///
/// The parent directory is created if missing. The move is a single
/// `rename`, so readers of `destination` see either the old file or the
/// complete new one. Renames across filesystems fail rather than fall
/// back to a copy.
pub fn install(extracted: &Path, destination: &Path) -> Result<(), ProvisionError> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            tracing::debug!("creating destination directory {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                ProvisionError::filesystem(format!("creating {}", parent.display()), e)
            })?;
        }
    }

    std::fs::rename(extracted, destination).map_err(|e| {
        ProvisionError::filesystem(
            format!(
                "moving {} to {}",
                extracted.display(),
                destination.display()
            ),
            e,
        )
    })?;

    tracing::info!("database installed at {}", destination.display());
    Ok(())
}
