use serde::{Deserialize, Serialize};

/// What kind of place a location is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationCategory {
    Venue,
    Hotel,
    CeremonySite,
    ReceptionSite,
    PhotoLocation,
}

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A resolved location, as supplied by the location directory.
///
/// `coordinates` is optional because directories sometimes only know the
/// address; such locations cannot be queried for traffic or weather.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDescriptor {
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
    pub category: LocationCategory,
}

impl LocationDescriptor {
    pub fn new(address: impl Into<String>, lat: f64, lng: f64, category: LocationCategory) -> Self {
        Self {
            address: address.into(),
            coordinates: Some(GeoPoint { lat, lng }),
            category,
        }
    }
}
