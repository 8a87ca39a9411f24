//! MaxMind Geo Database
//!
//! Implements GeoDatabase using a MaxMind GeoLite2/GeoIP2 `.mmdb` file.

use crate::domain::entities::CityRecord;
use crate::domain::errors::LookupError;
use crate::domain::ports::{DatabaseLoader, GeoDatabase};
use maxminddb::{MaxMindDBError, Reader};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// An opened MaxMind database.
///
/// The whole file is read into memory; lookups never touch the disk.
pub struct MaxMindDatabase {
    reader: Reader<Vec<u8>>,
}

impl MaxMindDatabase {
    /// Load a database from a file path.
    pub fn open(path: &Path) -> Result<Self, LookupError> {
        let reader = Reader::open_readfile(path).map_err(|e| {
            LookupError::InvalidDatabase(format!("{}: {}", path.display(), e))
        })?;
        tracing::debug!(
            "opened {} database built at {}",
            reader.metadata.database_type,
            reader.metadata.build_epoch
        );
        Ok(Self { reader })
    }

    /// Load a database from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, LookupError> {
        let reader = Reader::from_source(bytes)
            .map_err(|e| LookupError::InvalidDatabase(e.to_string()))?;
        Ok(Self { reader })
    }

    /// Database type recorded in the file metadata (e.g. "GeoLite2-City").
    pub fn database_type(&self) -> &str {
        &self.reader.metadata.database_type
    }
}

impl GeoDatabase for MaxMindDatabase {
    fn city(&self, ip: IpAddr) -> Result<CityRecord, LookupError> {
        self.reader.lookup::<CityRecord>(ip).map_err(|e| match e {
            MaxMindDBError::AddressNotFoundError(_) => LookupError::AddressNotFound(ip),
            other => LookupError::InvalidDatabase(other.to_string()),
        })
    }
}

/// Opens `.mmdb` files with [`MaxMindDatabase`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxMindLoader;

impl DatabaseLoader for MaxMindLoader {
    fn open(&self, path: &Path) -> Result<Arc<dyn GeoDatabase>, LookupError> {
        let database = MaxMindDatabase::open(path)?;
        Ok(Arc::new(database))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_nonexistent() {
        let result = MaxMindDatabase::open(Path::new("/nonexistent/path/GeoLite2.mmdb"));
        assert!(matches!(result, Err(LookupError::InvalidDatabase(_))));
    }

    #[test]
    fn test_open_garbage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GeoLite2-City.mmdb");
        std::fs::write(&path, b"definitely not a maxmind database").unwrap();

        let result = MaxMindDatabase::open(&path);
        assert!(matches!(result, Err(LookupError::InvalidDatabase(_))));
    }

    #[test]
    fn test_from_bytes_empty() {
        let result = MaxMindDatabase::from_bytes(Vec::new());
        assert!(matches!(result, Err(LookupError::InvalidDatabase(_))));
    }

    #[test]
    fn test_loader_propagates_invalid_database() {
        let dir = TempDir::new().unwrap();
        let result = MaxMindLoader.open(&dir.path().join("missing.mmdb"));
        assert!(matches!(result, Err(LookupError::InvalidDatabase(_))));
    }

    #[test]
    fn test_database_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MaxMindDatabase>();
        assert_send_sync::<MaxMindLoader>();
    }
}
