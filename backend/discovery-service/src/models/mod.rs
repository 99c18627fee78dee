use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::utils::geo::is_valid_coordinates;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Returns `None` when either coordinate is non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if is_valid_coordinates(latitude, longitude) {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// GeoJSON point as stored on listings: `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLocation {
    #[serde(rename = "type", default = "point_type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

fn point_type() -> String {
    "Point".to_string()
}

impl StoredLocation {
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            kind: point_type(),
            coordinates: vec![point.longitude(), point.latitude()],
        }
    }

    /// Malformed or out-of-range locations normalize to `None`.
    pub fn to_point(&self) -> Option<GeoPoint> {
        if !self.kind.eq_ignore_ascii_case("point") {
            return None;
        }
        match self.coordinates.as_slice() {
            [longitude, latitude] => GeoPoint::new(*latitude, *longitude),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Vendor,
    Product,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Vendor => "vendor",
            ListingKind::Product => "product",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorType {
    Restaurant,
    Mart,
    Pharmacy,
}

impl VendorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorType::Restaurant => "restaurant",
            VendorType::Mart => "mart",
            VendorType::Pharmacy => "pharmacy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "restaurant" | "restaurants" => Some(VendorType::Restaurant),
            "mart" | "grocery" => Some(VendorType::Mart),
            "pharmacy" | "pharmacies" => Some(VendorType::Pharmacy),
            _ => None,
        }
    }
}

/// A vendor or product document as returned by the catalog.
///
/// Only the fields the discovery pipeline reads are typed; everything else is
/// kept in `extra` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    #[serde(rename = "role")]
    pub kind: ListingKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_type: Option<VendorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<StoredLocation>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_active() -> bool {
    true
}

/// Normalized view the ranking pipeline works against.
pub trait Rankable {
    fn coordinates(&self) -> Option<GeoPoint>;
    fn is_featured(&self) -> bool;
    fn rating(&self) -> Option<f64>;
}

impl Rankable for Listing {
    fn coordinates(&self) -> Option<GeoPoint> {
        self.location.as_ref().and_then(StoredLocation::to_point)
    }

    fn is_featured(&self) -> bool {
        self.is_featured
    }

    /// Vendors carry `rating`; products carry their store's `storeRating`.
    fn rating(&self) -> Option<f64> {
        self.rating
            .or(self.store_rating)
            .filter(|rating| !rating.is_nan())
    }
}

/// A ranked entity plus the distance to the user, when one was computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub entity: T,
    pub distance_km: Option<f64>,
}

impl<T> Ranked<T> {
    pub fn new(entity: T, distance_km: Option<f64>) -> Self {
        Self {
            entity,
            distance_km,
        }
    }
}

impl<T: Rankable> Rankable for Ranked<T> {
    fn coordinates(&self) -> Option<GeoPoint> {
        self.entity.coordinates()
    }

    fn is_featured(&self) -> bool {
        self.entity.is_featured()
    }

    fn rating(&self) -> Option<f64> {
        self.entity.rating()
    }
}

// Serialized as the entity's own fields with `distance` appended. `distance`
// is only ever the computed one; a stored field of that name is dropped.
// Non-object entities are wrapped instead of flattened.
impl<T: Serialize> Serialize for Ranked<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = serde_json::to_value(&self.entity).map_err(serde::ser::Error::custom)?;
        match (value, self.distance_km) {
            (serde_json::Value::Object(mut fields), Some(distance)) => {
                fields.insert("distance".to_string(), serde_json::json!(distance));
                fields.serialize(serializer)
            }
            (serde_json::Value::Object(mut fields), None) => {
                fields.remove("distance");
                fields.serialize(serializer)
            }
            (other, distance) => serde_json::json!({ "entity": other, "distance": distance })
                .serialize(serializer),
        }
    }
}
