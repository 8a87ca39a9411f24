//! Archive Extractor
//!
//! Unpacks the database file out of a staged `.tar.gz` archive.
//! Runs synchronously; callers on the async runtime should move it
//! onto the blocking pool.

use crate::domain::errors::ProvisionError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tar::Archive;

/// Suffix of the entry to pull out of the archive.
pub const DATABASE_SUFFIX: &str = ".mmdb";

/// Locates and extracts a single file from a gzip-compressed tarball.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    suffix: String,
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new(DATABASE_SUFFIX)
    }
}

impl ArchiveExtractor {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// Decompress, locate and unpack in one go.
    ///
    /// Returns the path of the extracted file inside `work_dir`.
    pub fn extract(&self, archive: &Path, work_dir: &Path) -> Result<PathBuf, ProvisionError> {
        let tar_path = self.decompress(archive)?;
        let entry = self.locate(&tar_path)?;
        self.unpack(&tar_path, &entry, work_dir)
    }

    /// Gunzip `archive` into a sibling file without the `.gz` suffix.
    pub fn decompress(&self, archive: &Path) -> Result<PathBuf, ProvisionError> {
        let tar_path = tar_path_for(archive);

        let input = File::open(archive).map_err(|e| {
            ProvisionError::filesystem(format!("opening {}", archive.display()), e)
        })?;
        let output = File::create(&tar_path).map_err(|e| {
            ProvisionError::filesystem(format!("creating {}", tar_path.display()), e)
        })?;

        let mut decoder = GzDecoder::new(BufReader::new(input));
        let mut writer = BufWriter::new(output);
        let bytes = io::copy(&mut decoder, &mut writer).map_err(|e| {
            ProvisionError::Extraction(format!(
                "failed to decompress {}: {}",
                archive.display(),
                e
            ))
        })?;
        writer.flush().map_err(|e| {
            ProvisionError::filesystem(format!("writing {}", tar_path.display()), e)
        })?;

        tracing::debug!("decompressed {} bytes to {}", bytes, tar_path.display());
        Ok(tar_path)
    }

    /// Find the first regular file whose name ends with the target suffix.
    ///
    /// Entries are visited in archive order; the returned path is
    /// relative to the archive root with any `./` segments dropped.
    /// Absolute entries and entries containing `..` are skipped.
    pub fn locate(&self, tar_path: &Path) -> Result<PathBuf, ProvisionError> {
        let mut archive = open_tar(tar_path)?;

        for entry in archive.entries().map_err(corrupt(tar_path))? {
            let entry = entry.map_err(corrupt(tar_path))?;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let path = entry.path().map_err(corrupt(tar_path))?;
            let matches = path
                .file_name()
                .map(|name| name.to_string_lossy().ends_with(&self.suffix))
                .unwrap_or(false);

            if !matches {
                continue;
            }

            match contained(&path) {
                Some(relative) => {
                    tracing::debug!("found {} in archive", relative.display());
                    return Ok(relative);
                }
                None => tracing::warn!("skipping unsafe archive entry {}", path.display()),
            }
        }

        Err(ProvisionError::Extraction(format!(
            "target file ({}) not found in archive",
            self.suffix
        )))
    }

    /// Extract the entry at `entry_path` into `work_dir`.
    ///
    /// The relative path is preserved and any stale copy is replaced.
    /// A path that could land outside `work_dir` is refused before
    /// anything on disk is touched.
    pub fn unpack(
        &self,
        tar_path: &Path,
        entry_path: &Path,
        work_dir: &Path,
    ) -> Result<PathBuf, ProvisionError> {
        let relative = contained(entry_path).ok_or_else(|| {
            ProvisionError::Extraction(format!(
                "refusing to unpack {} outside the working area",
                entry_path.display()
            ))
        })?;

        let mut archive = open_tar(tar_path)?;
        for entry in archive.entries().map_err(corrupt(tar_path))? {
            let mut entry = entry.map_err(corrupt(tar_path))?;
            let is_target = {
                let path = entry.path().map_err(corrupt(tar_path))?;
                contained(&path).as_deref() == Some(relative.as_path())
            };
            if !is_target {
                continue;
            }

            // existing files are overwritten by the archive
            let unpacked = entry.unpack_in(work_dir).map_err(|e| {
                ProvisionError::Extraction(format!(
                    "failed to unpack {}: {}",
                    relative.display(),
                    e
                ))
            })?;
            if !unpacked {
                return Err(ProvisionError::Extraction(format!(
                    "refusing to unpack {} outside the working area",
                    relative.display()
                )));
            }
            return Ok(work_dir.join(relative));
        }

        Err(ProvisionError::Extraction(format!(
            "{} not found in archive",
            relative.display()
        )))
    }
}

/// Normalize an archive entry path to one that stays under its root.
///
/// `.` segments are dropped. Returns `None` for absolute paths, paths
/// with `..` and paths with nothing left.
fn contained(path: &Path) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

fn tar_path_for(archive: &Path) -> PathBuf {
    match archive.extension() {
        Some(ext) if ext == "gz" => archive.with_extension(""),
        _ => archive.with_extension("tar"),
    }
}

fn open_tar(tar_path: &Path) -> Result<Archive<BufReader<File>>, ProvisionError> {
    let file = File::open(tar_path).map_err(|e| {
        ProvisionError::filesystem(format!("opening {}", tar_path.display()), e)
    })?;
    Ok(Archive::new(BufReader::new(file)))
}

fn corrupt(tar_path: &Path) -> impl Fn(io::Error) -> ProvisionError + '_ {
    move |e| {
        ProvisionError::Extraction(format!("corrupt archive {}: {}", tar_path.display(), e))
    }
}
