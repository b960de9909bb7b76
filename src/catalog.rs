//! Static location catalog and categorical feature enumerations.
//!
//! The catalog lists the Bangalore areas and roads the prediction model was
//! trained on. It is built once at startup, shared read-only via `Arc`, and
//! never mutated at runtime. It constrains the UI (autocomplete) rather than
//! the API: predictions for areas outside the catalog are still attempted,
//! mirroring the model's own unknown-category fallback.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An area and its monitored roads, in display order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogEntry {
    /// Area name (e.g. "Indiranagar")
    pub area: String,
    /// Roads within the area, ordered
    pub roads: Vec<String>,
}

/// Read-only catalog of areas, roads and categorical options.
#[derive(Debug)]
pub struct LocationCatalog {
    entries: Vec<CatalogEntry>,
}

impl LocationCatalog {
    /// Build the catalog of monitored Bangalore corridors.
    pub fn bangalore() -> Self {
        let entry = |area: &str, roads: [&str; 4]| CatalogEntry {
            area: area.to_string(),
            roads: roads.iter().map(|r| r.to_string()).collect(),
        };

        Self {
            entries: vec![
                entry(
                    "Indiranagar",
                    ["100 Feet Road", "12th Main Road", "CMH Road", "Old Airport Road"],
                ),
                entry(
                    "Koramangala",
                    ["5th Block", "6th Block", "7th Block", "Intermediate Ring Road"],
                ),
                entry(
                    "Whitefield",
                    [
                        "ITPL Main Road",
                        "Varthur Road",
                        "Whitefield Main Road",
                        "Hope Farm Junction",
                    ],
                ),
                entry(
                    "Electronic City",
                    [
                        "Hosur Road",
                        "Electronic City Phase 1",
                        "Electronic City Phase 2",
                        "Bommasandra Road",
                    ],
                ),
                entry(
                    "Hebbal",
                    ["Outer Ring Road", "Bellary Road", "Hebbal Flyover", "Nagawara"],
                ),
                entry(
                    "BTM Layout",
                    ["BTM 1st Stage", "BTM 2nd Stage", "Bannerghatta Road", "Silk Board"],
                ),
                entry(
                    "Marathahalli",
                    [
                        "Marathahalli Bridge",
                        "Outer Ring Road",
                        "Varthur Road",
                        "Kundalahalli",
                    ],
                ),
                entry(
                    "Jayanagar",
                    [
                        "4th Block",
                        "9th Block",
                        "South End Circle",
                        "Jayanagar Shopping Complex",
                    ],
                ),
            ],
        }
    }

    /// All catalog entries, in display order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

/// Weather condition as accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rainy,
    Foggy,
}

impl WeatherCondition {
    /// All valid options, in the order shown to clients.
    pub const ALL: [WeatherCondition; 4] = [
        WeatherCondition::Clear,
        WeatherCondition::Cloudy,
        WeatherCondition::Rainy,
        WeatherCondition::Foggy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::Cloudy => "Cloudy",
            WeatherCondition::Rainy => "Rainy",
            WeatherCondition::Foggy => "Foggy",
        }
    }

    /// Parse a wire value. Case-sensitive: the UI sends the exact option
    /// strings returned by /api/locations.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|w| w.as_str() == s)
    }
}

/// Roadwork activity flag, "Yes"/"No" on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RoadworkActivity {
    Yes,
    No,
}

impl RoadworkActivity {
    /// All valid options, in the order shown to clients.
    pub const ALL: [RoadworkActivity; 2] = [RoadworkActivity::Yes, RoadworkActivity::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoadworkActivity::Yes => "Yes",
            RoadworkActivity::No => "No",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.as_str() == s)
    }
}
