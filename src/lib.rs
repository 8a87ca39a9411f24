//! geolite-kit Library
//!
//! Provisioning of MaxMind GeoLite2 databases and IP geolocation
//! lookups against the installed copy.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::outbound::{MaxMindDatabase, MaxMindLoader, StdoutProgress};
pub use application::{Provisioner, Resolver};
pub use config::{load_config, load_config_file, Config, ProvisioningConfig};
pub use domain::entities::{CityRecord, Location, LookupOutcome};
pub use domain::errors::{ConfigError, LookupError, ProvisionError};
pub use domain::ports::{DatabaseLoader, GeoDatabase, ProgressSink};
pub use domain::value_objects::{is_valid_country_code, CountryCode, SUPPORTED_COUNTRIES};
