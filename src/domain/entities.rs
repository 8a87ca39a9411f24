//! Domain Entities - Core lookup objects
//!
//! `CityRecord` mirrors the GeoIP2 City layout stored in the database.
//! `Location` is the flattened view handed to callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locale used when picking a name out of a record's `names` map.
pub const DEFAULT_LOCALE: &str = "en";

/// Localized names keyed by locale code ("en", "de", "pt-BR", ...).
pub type Names = BTreeMap<String, String>;

fn localized(names: &Option<Names>) -> Option<String> {
    names.as_ref()?.get(DEFAULT_LOCALE).cloned()
}

/// Full structured record for one network, as decoded from the database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub city: Option<CityNames>,
    pub continent: Option<Continent>,
    pub country: Option<Country>,
    pub registered_country: Option<Country>,
    pub location: Option<Coordinates>,
    pub postal: Option<Postal>,
    pub subdivisions: Option<Vec<Subdivision>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityNames {
    pub geoname_id: Option<u32>,
    pub names: Option<Names>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Continent {
    pub code: Option<String>,
    pub geoname_id: Option<u32>,
    pub names: Option<Names>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub geoname_id: Option<u32>,
    pub is_in_european_union: Option<bool>,
    pub iso_code: Option<String>,
    pub names: Option<Names>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub accuracy_radius: Option<u16>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Postal {
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subdivision {
    pub geoname_id: Option<u32>,
    pub iso_code: Option<String>,
    pub names: Option<Names>,
}

impl CityRecord {
    /// The most specific subdivision is the last one listed.
    pub fn most_specific_subdivision(&self) -> Option<&Subdivision> {
        self.subdivisions.as_ref()?.last()
    }
}

/// Geographic location resolved from an IP address.
///
/// A straight projection of a [`CityRecord`]: whatever the database
/// leaves out stays `None`.
///
/// A `Found` lookup may therefore be partial. Networks known only at
/// country level (no city, no subdivision, sometimes no coordinates)
/// still resolve, with those fields empty, rather than being reported
/// as not found. Callers that need a complete location must check the
/// fields they rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub continent: Option<String>,
    pub country: Option<String>,
    /// Country code (ISO 3166-1 alpha-2)
    pub iso_code: Option<String>,
    /// Most specific subdivision name
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
}

impl From<&CityRecord> for Location {
    fn from(record: &CityRecord) -> Self {
        let coordinates = record.location.as_ref();
        Self {
            continent: record.continent.as_ref().and_then(|c| localized(&c.names)),
            country: record.country.as_ref().and_then(|c| localized(&c.names)),
            iso_code: record.country.as_ref().and_then(|c| c.iso_code.clone()),
            region: record
                .most_specific_subdivision()
                .and_then(|s| localized(&s.names)),
            city: record.city.as_ref().and_then(|c| localized(&c.names)),
            latitude: coordinates.and_then(|l| l.latitude),
            longitude: coordinates.and_then(|l| l.longitude),
            timezone: coordinates.and_then(|l| l.time_zone.clone()),
        }
    }
}

/// Result of a fail-soft lookup.
///
/// Any failure along the way collapses into `NotFound`.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Location),
    NotFound,
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_option(self) -> Option<Location> {
        match self {
            Self::Found(location) => Some(location),
            Self::NotFound => None,
        }
    }
}

impl From<Option<Location>> for LookupOutcome {
    fn from(location: Option<Location>) -> Self {
        location.map_or(Self::NotFound, Self::Found)
    }
}
