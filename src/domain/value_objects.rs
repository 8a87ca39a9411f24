//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.

use serde::Serialize;

/// Countries this service recognizes (ISO 3166-1 alpha-2).
///
/// A curated subset of the assigned codes, kept sorted so membership
/// is a binary search.
pub const SUPPORTED_COUNTRIES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AR", "AS", "AT", "AU", "AW", "AX", "AZ",
    "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BM", "BN", "BO", "BR", "BS", "BT",
    "BW", "BY", "BZ", "CA", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN", "CO", "CR",
    "CU", "CV", "CY", "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ", "EC", "EE", "EG", "ER", "ES",
    "ET", "FI", "FJ", "FM", "FR", "GA", "GB", "GD", "GE", "GH", "GI", "GL", "GM", "GN", "GQ",
    "GR", "GT", "GW", "GY", "HK", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IN", "IQ", "IR",
    "IS", "IT", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR", "KW", "KZ",
    "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME",
    "MG", "MH", "MK", "ML", "MM", "MN", "MR", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA",
    "NE", "NG", "NI", "NL", "NO", "NP", "NR", "NZ", "OM", "PA", "PE", "PG", "PH", "PK", "PL",
    "PT", "PW", "PY", "QA", "RO", "RS", "RU", "RW", "SA", "SB", "SC", "SD", "SE", "SG", "SI",
    "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV", "SY", "SZ", "TD", "TG", "TH", "TJ",
    "TL", "TM", "TN", "TO", "TR", "TT", "TV", "TZ", "UA", "UG", "US", "UY", "UZ", "VA", "VC",
    "VE", "VN", "VU", "WS", "YE", "ZA", "ZM", "ZW",
];

/// A country code from [`SUPPORTED_COUNTRIES`].
///
/// Input is trimmed and uppercased before the lookup, so `" us "`
/// and `"US"` parse to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CountryCode(&'static str);

impl CountryCode {
    /// Parse a country code, returning `None` if it is not supported.
    pub fn parse(code: &str) -> Option<Self> {
        let normalized = code.trim().to_uppercase();
        SUPPORTED_COUNTRIES
            .binary_search_by(|probe| (*probe).cmp(normalized.as_str()))
            .ok()
            .map(|idx| Self(SUPPORTED_COUNTRIES[idx]))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether `code` names a supported country.
pub fn is_valid_country_code(code: &str) -> bool {
    CountryCode::parse(code).is_some()
}
