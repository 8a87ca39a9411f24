//! Infrastructure Layer
//!
//! Filesystem, network and archive plumbing for database provisioning.

pub mod archive_extractor;
pub mod archive_stager;
pub mod installer;
pub mod working_area;

pub use archive_extractor::{ArchiveExtractor, DATABASE_SUFFIX};
pub use archive_stager::{ArchiveStager, ARCHIVE_FILE_NAME, DOWNLOAD_PATH};
pub use installer::install;
pub use working_area::WorkingArea;
