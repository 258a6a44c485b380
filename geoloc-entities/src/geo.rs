use std::fmt;

/// A resolved position in decimal degrees (WGS 84).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    const LAT_DEG_MAX: f64 = 90.0;
    const LNG_DEG_MAX: f64 = 180.0;

    pub const fn from_lat_lng_deg(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Only returns coordinates within the valid ranges.
    pub fn try_from_lat_lng_deg(lat: f64, lng: f64) -> Option<Self> {
        let pos = Self::from_lat_lng_deg(lat, lng);
        pos.is_valid().then_some(pos)
    }

    pub const fn lat(self) -> f64 {
        self.lat
    }

    pub const fn lng(self) -> f64 {
        self.lng
    }

    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= Self::LAT_DEG_MAX
            && self.lng.abs() <= Self::LNG_DEG_MAX
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

/// Outcome of geocoding a single row.
///
/// Both fields absent means that the address could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeocodeResult {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeocodeResult {
    pub const fn unresolved() -> Self {
        Self {
            latitude: None,
            longitude: None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::from_lat_lng_deg(lat, lng)),
            _ => None,
        }
    }
}

impl From<Coordinates> for GeocodeResult {
    fn from(pos: Coordinates) -> Self {
        Self {
            latitude: Some(pos.lat()),
            longitude: Some(pos.lng()),
        }
    }
}

impl From<Option<Coordinates>> for GeocodeResult {
    fn from(pos: Option<Coordinates>) -> Self {
        pos.map(Self::from).unwrap_or_default()
    }
}
