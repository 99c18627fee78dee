use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::RankingSettings;
use crate::error::{AppError, Result};
use crate::models::{Listing, ListingKind, Ranked, VendorType};
use crate::services::{GeoQueryBuilder, ListingQuery, RankingContext, RankingOrchestrator};
use crate::store::CandidateStore;
use crate::utils::geo::parse_geo_point;
use crate::utils::{parse_flag, parse_limit};

/// Shared state for the listing endpoints.
pub struct DiscoveryHandlerState {
    pub store: Arc<dyn CandidateStore>,
    pub orchestrator: RankingOrchestrator,
    pub query_builder: GeoQueryBuilder,
    pub settings: RankingSettings,
}

impl DiscoveryHandlerState {
    pub fn new(store: Arc<dyn CandidateStore>, settings: RankingSettings) -> Self {
        Self {
            store,
            orchestrator: RankingOrchestrator::from_settings(&settings),
            query_builder: GeoQueryBuilder::new(settings.default_radius_km),
            settings,
        }
    }
}

/// Raw query string. Every field is kept as text so bad values degrade
/// instead of rejecting the request.
///
/// Short coordinate names are separate fields rather than serde aliases, so
/// `?lat=..&latitude=..` is not a duplicate-field error. Full names win.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQueryParams {
    pub latitude: Option<String>,
    pub lat: Option<String>,
    pub longitude: Option<String>,
    pub lng: Option<String>,
    pub lon: Option<String>,
    pub radius: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub vendor_type: Option<String>,
    pub featured: Option<String>,
    pub shuffle: Option<String>,
    pub limit: Option<String>,
}

impl ListingQueryParams {
    pub fn latitude(&self) -> Option<&str> {
        self.latitude.as_deref().or(self.lat.as_deref())
    }

    pub fn longitude(&self) -> Option<&str> {
        self.longitude
            .as_deref()
            .or(self.lng.as_deref())
            .or(self.lon.as_deref())
    }
}

/// GET /api/v1/vendors
#[get("/api/v1/vendors")]
pub async fn list_vendors(
    state: web::Data<DiscoveryHandlerState>,
    params: web::Query<ListingQueryParams>,
) -> Result<HttpResponse> {
    let vendor_type = match params.vendor_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(VendorType::parse(raw).ok_or_else(|| {
            AppError::BadRequest(format!(
                "unknown vendor type {:?}, expected restaurant, mart or pharmacy",
                raw
            ))
        })?),
    };

    let ranked = discover(&state, ListingKind::Vendor, vendor_type, &params).await?;
    Ok(HttpResponse::Ok().json(ranked))
}

/// GET /api/v1/products
#[get("/api/v1/products")]
pub async fn list_products(
    state: web::Data<DiscoveryHandlerState>,
    params: web::Query<ListingQueryParams>,
) -> Result<HttpResponse> {
    let ranked = discover(&state, ListingKind::Product, None, &params).await?;
    Ok(HttpResponse::Ok().json(ranked))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(|| async { "OK" }))
        .service(list_vendors)
        .service(list_products);
}

/// Fetch, rank and cap one listing page.
pub async fn discover(
    state: &DiscoveryHandlerState,
    kind: ListingKind,
    vendor_type: Option<VendorType>,
    params: &ListingQueryParams,
) -> Result<Vec<Ranked<Listing>>> {
    let user_location = parse_geo_point(params.latitude(), params.longitude());
    let query = ListingQuery {
        kind,
        vendor_type,
        category: params.category.clone(),
        user_location,
        radius_km: params
            .radius
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok()),
        featured_only: params.featured.as_deref().and_then(parse_flag) == Some(true),
    };
    let shuffle_enabled = params
        .shuffle
        .as_deref()
        .and_then(parse_flag)
        .unwrap_or(true);
    let limit = parse_limit(
        params.limit.as_deref(),
        state.settings.default_limit,
        state.settings.max_limit,
    );

    let filter = state.query_builder.build(&query);
    let candidates = state.store.find_candidates(&filter).await.map_err(|e| {
        error!(error = %e, kind = kind.as_str(), "Candidate fetch failed");
        AppError::from(e)
    })?;

    let context = RankingContext {
        user_location,
        shuffle_enabled,
        ..RankingContext::from_settings(&state.settings)
    };
    let mut ranked = state.orchestrator.rank(&candidates, &context);
    ranked.truncate(limit);

    info!(
        kind = kind.as_str(),
        located = user_location.is_some(),
        candidates = candidates.len(),
        returned = ranked.len(),
        shuffle = shuffle_enabled,
        "Listing page ranked"
    );
    Ok(ranked)
}
