use serde_json::{json, Map, Value};

use crate::config::DEFAULT_RADIUS_KM;
use crate::models::{GeoPoint, Listing, ListingKind, Rankable, VendorType};
use crate::utils::geo::distance_km;

/// Caller-supplied listing criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub kind: ListingKind,
    pub vendor_type: Option<VendorType>,
    pub category: Option<String>,
    pub user_location: Option<GeoPoint>,
    pub radius_km: Option<f64>,
    pub featured_only: bool,
}

impl ListingQuery {
    pub fn new(kind: ListingKind) -> Self {
        Self {
            kind,
            vendor_type: None,
            category: None,
            user_location: None,
            radius_km: None,
            featured_only: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearConstraint {
    pub center: GeoPoint,
    pub max_distance_m: f64,
}

/// Filter handed to the catalog store.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFilter {
    pub kind: ListingKind,
    pub vendor_type: Option<VendorType>,
    /// Lowercased, trimmed, never empty.
    pub category: Option<String>,
    pub featured_only: bool,
    pub near: Option<NearConstraint>,
}

impl CandidateFilter {
    /// Mongo-style filter document for a `2dsphere`-indexed collection.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("role".to_string(), json!(self.kind.as_str()));
        doc.insert("isActive".to_string(), json!(true));
        if let Some(vendor_type) = self.vendor_type {
            doc.insert("vendorType".to_string(), json!(vendor_type.as_str()));
        }
        if self.featured_only {
            doc.insert("isFeatured".to_string(), json!(true));
        }
        if let Some(category) = &self.category {
            let pattern = json!({ "$regex": escape_regex(category), "$options": "i" });
            doc.insert(
                "$or".to_string(),
                json!([{ "category": pattern.clone() }, { "tags": pattern }]),
            );
        }
        if let Some(near) = &self.near {
            doc.insert(
                "location".to_string(),
                json!({
                    "$near": {
                        "$geometry": {
                            "type": "Point",
                            "coordinates": [near.center.longitude(), near.center.latitude()],
                        },
                        "$maxDistance": near.max_distance_m,
                    }
                }),
            );
        }
        Value::Object(doc)
    }

    /// Evaluates the same predicates as [`Self::to_document`] against one listing.
    pub fn matches(&self, listing: &Listing) -> bool {
        if listing.kind != self.kind || !listing.is_active {
            return false;
        }
        if self.vendor_type.is_some() && listing.vendor_type != self.vendor_type {
            return false;
        }
        if self.featured_only && !listing.is_featured {
            return false;
        }
        if let Some(category) = &self.category {
            let in_category = listing
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(category.as_str()));
            let in_tags = listing
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(category.as_str()));
            if !in_category && !in_tags {
                return false;
            }
        }
        if let Some(near) = &self.near {
            // $near excludes documents without a location
            let Some(point) = listing.coordinates() else {
                return false;
            };
            if distance_km(near.center, point) * 1000.0 > near.max_distance_m {
                return false;
            }
        }
        true
    }
}

/// Geospatial Query Builder
///
/// Translates listing criteria into a [`CandidateFilter`]. Radius is given in
/// km and emitted in meters, as the geospatial index expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoQueryBuilder {
    default_radius_km: f64,
}

impl Default for GeoQueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS_KM)
    }
}

impl GeoQueryBuilder {
    pub fn new(default_radius_km: f64) -> Self {
        Self { default_radius_km }
    }

    pub fn build(&self, query: &ListingQuery) -> CandidateFilter {
        let category = query
            .category
            .as_deref()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());

        let near = query.user_location.map(|center| NearConstraint {
            center,
            max_distance_m: self.effective_radius_km(query.radius_km) * 1000.0,
        });

        CandidateFilter {
            kind: query.kind,
            vendor_type: query.vendor_type,
            category,
            featured_only: query.featured_only,
            near,
        }
    }

    /// Missing, non-positive radii, or radii whose meter value is not finite,
    /// fall back to the default.
    pub fn effective_radius_km(&self, radius_km: Option<f64>) -> f64 {
        radius_km
            .filter(|r| *r > 0.0 && (*r * 1000.0).is_finite())
            .unwrap_or(self.default_radius_km)
    }
}

fn escape_regex(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(
            ch,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
