//! Domain Layer
//!
//! Lookup entities, value objects, errors and the ports the
//! application layer depends on.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod value_objects;

pub use entities::{CityRecord, Location, LookupOutcome};
pub use errors::{ConfigError, LookupError, ProvisionError};
pub use value_objects::{is_valid_country_code, CountryCode, SUPPORTED_COUNTRIES};
