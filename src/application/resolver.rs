//! Resolver - IP to location lookups
//!
//! Holds the currently loaded database and answers lookups against it.
//! Handles are swapped, never mutated, so a lookup that started on an
//! older database finishes on it even if `load` runs concurrently.

use crate::adapters::outbound::MaxMindLoader;
use crate::domain::entities::{CityRecord, Location, LookupOutcome};
use crate::domain::errors::{ConfigError, LookupError};
use crate::domain::ports::{DatabaseLoader, GeoDatabase};
use crate::domain::value_objects::{self, SUPPORTED_COUNTRIES};
use parking_lot::RwLock;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// Geolocation facade over one loaded database.
pub struct Resolver {
    loader: Arc<dyn DatabaseLoader>,
    database: RwLock<Option<Arc<dyn GeoDatabase>>>,
}

impl Resolver {
    /// Create a resolver that opens databases with `loader`.
    ///
    /// No database is loaded yet; call [`Resolver::load`] first.
    pub fn new(loader: Arc<dyn DatabaseLoader>) -> Self {
        Self {
            loader,
            database: RwLock::new(None),
        }
    }

    /// Create a resolver backed by MaxMind `.mmdb` files.
    pub fn maxmind() -> Self {
        Self::new(Arc::new(MaxMindLoader))
    }

    /// Create a resolver around an already opened database.
    pub fn with_database(loader: Arc<dyn DatabaseLoader>, database: Arc<dyn GeoDatabase>) -> Self {
        Self {
            loader,
            database: RwLock::new(Some(database)),
        }
    }

    /// Open the database at `path` and make it the active one.
    ///
    /// On failure the previously loaded database, if any, stays active.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(), LookupError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::MissingDestination.into());
        }

        let database = self.loader.open(path)?;
        *self.database.write() = Some(database);

        tracing::info!("GeoIP DB loaded from {}", path.display());
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.database.read().is_some()
    }

    /// The active database handle.
    ///
    /// Holding the returned `Arc` keeps that database alive across
    /// later calls to [`Resolver::load`].
    pub fn database(&self) -> Option<Arc<dyn GeoDatabase>> {
        self.database.read().clone()
    }

    /// Resolve `ip` to a location.
    ///
    /// Never fails: a malformed address, a missing entry, a broken
    /// database or no database at all all come back as `NotFound`.
    pub fn lookup(&self, ip: &str) -> LookupOutcome {
        match self.raw_lookup(ip) {
            Ok(record) => LookupOutcome::Found(Location::from(&record)),
            Err(e) => {
                tracing::debug!("lookup for {:?} returned nothing: {}", ip, e);
                LookupOutcome::NotFound
            }
        }
    }

    /// Same as [`Resolver::lookup`] for an already parsed address.
    pub fn lookup_addr(&self, ip: IpAddr) -> LookupOutcome {
        match self.raw_lookup_addr(ip) {
            Ok(record) => LookupOutcome::Found(Location::from(&record)),
            Err(e) => {
                tracing::debug!("lookup for {} returned nothing: {}", ip, e);
                LookupOutcome::NotFound
            }
        }
    }

    /// Resolve `ip` to the full database record, propagating failures.
    pub fn raw_lookup(&self, ip: &str) -> Result<CityRecord, LookupError> {
        let addr: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| LookupError::InvalidAddress(ip.to_string()))?;
        self.raw_lookup_addr(addr)
    }

    /// Same as [`Resolver::raw_lookup`] for an already parsed address.
    pub fn raw_lookup_addr(&self, ip: IpAddr) -> Result<CityRecord, LookupError> {
        let database = self.database().ok_or(LookupError::NotLoaded)?;
        database.city(ip)
    }

    /// Whether `code` is one of the supported ISO 3166-1 alpha-2 codes.
    ///
    /// Surrounding whitespace and letter case are ignored.
    pub fn is_valid_country_code(code: &str) -> bool {
        value_objects::is_valid_country_code(code)
    }

    /// The supported country codes, sorted.
    pub fn supported_countries() -> &'static [&'static str] {
        SUPPORTED_COUNTRIES
    }
}
