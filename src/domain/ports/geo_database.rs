//! Geo Database Port
//!
//! Defines the interface for opening and querying a binary geo-database.

use crate::domain::entities::CityRecord;
use crate::domain::errors::LookupError;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// An opened geo-database.
///
/// This is an outbound port that abstracts the database reader.
/// Implementations are read-only after construction and must tolerate
/// concurrent lookups.
pub trait GeoDatabase: Send + Sync {
    /// Look up the full city record for an address.
    ///
    /// Returns `LookupError::AddressNotFound` when the database has no
    /// entry for `ip`, and `LookupError::InvalidDatabase` when the data
    /// cannot be decoded.
    fn city(&self, ip: IpAddr) -> Result<CityRecord, LookupError>;
}

/// Opens a [`GeoDatabase`] from a file on disk.
pub trait DatabaseLoader: Send + Sync {
    /// Open the database at `path`.
    ///
    /// Missing, unreadable or malformed files fail with
    /// `LookupError::InvalidDatabase`.
    fn open(&self, path: &Path) -> Result<Arc<dyn GeoDatabase>, LookupError>;
}
