use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use discovery_service::models::{GeoPoint, Listing, StoredLocation};
use discovery_service::{handlers, DiscoveryHandlerState, InMemoryCandidateStore, RankingSettings};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

fn located(raw: Value, latitude: f64, longitude: f64) -> Listing {
    let mut listing: Listing = serde_json::from_value(raw).unwrap();
    listing.location = Some(StoredLocation::from_point(
        GeoPoint::new(latitude, longitude).unwrap(),
    ));
    listing
}

// Around MG Road, Bengaluru. Distances are from (12.9750, 77.6060).
fn catalog() -> Vec<Listing> {
    vec![
        located(
            json!({ "id": "r-near", "role": "vendor", "vendorType": "restaurant",
                    "category": "South Indian", "rating": 3.2, "storeName": "Udupi Corner" }),
            12.9755,
            77.6065,
        ),
        located(
            json!({ "id": "r-mid", "role": "vendor", "vendorType": "restaurant",
                    "category": "Pizza", "rating": 4.9, "isFeatured": true }),
            12.9900,
            77.6060,
        ),
        located(
            json!({ "id": "m-near", "role": "vendor", "vendorType": "mart",
                    "tags": ["Dairy", "Bakery"], "rating": 4.1 }),
            12.9760,
            77.6070,
        ),
        located(
            json!({ "id": "r-far", "role": "vendor", "vendorType": "restaurant",
                    "rating": 4.7 }),
            13.1986,
            77.7066,
        ),
        serde_json::from_value(json!({
            "id": "r-closed", "role": "vendor", "vendorType": "restaurant", "isActive": false
        }))
        .unwrap(),
        located(
            json!({ "id": "p-milk", "role": "product", "category": "Dairy",
                    "storeRating": 4.1, "price": 32 }),
            12.9760,
            77.6070,
        ),
        serde_json::from_value(json!({
            "id": "p-bread", "role": "product", "category": "Bakery", "storeRating": 3.9
        }))
        .unwrap(),
    ]
}

fn state(settings: RankingSettings) -> web::Data<DiscoveryHandlerState> {
    let store = InMemoryCandidateStore::with_listings(catalog());
    web::Data::new(DiscoveryHandlerState::new(Arc::new(store), settings))
}

// Same middleware stack as the binary.
async fn get_json(uri: &str, settings: RankingSettings) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state(settings))
            .configure(handlers::configure),
    )
    .await;
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn health_check() {
    let app = test::init_service(
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state(RankingSettings::default()))
            .configure(handlers::configure),
    )
    .await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn nearby_restaurants_within_radius_sorted_by_bucket() {
    let (status, body) = get_json(
        "/api/v1/vendors?type=restaurant&latitude=12.9750&longitude=77.6060",
        RankingSettings::default(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // r-far is ~26 km out, beyond the 10 km default radius; r-closed is inactive
    assert_eq!(ids(&body), vec!["r-near", "r-mid"]);

    let near = &body[0];
    assert!(near["distance"].as_f64().unwrap() < 1.0);
    assert_eq!(near["storeName"], json!("Udupi Corner"));
    assert!(body[1]["distance"].as_f64().unwrap() >= 1.0);
}

#[actix_web::test]
async fn wider_radius_reaches_overflow_bucket() {
    let (_, body) = get_json(
        "/api/v1/vendors?type=restaurant&lat=12.9750&lng=77.6060&radius=30",
        RankingSettings::default(),
    )
    .await;

    assert_eq!(ids(&body), vec!["r-near", "r-mid", "r-far"]);
    assert!(body[2]["distance"].as_f64().unwrap() > 10.0);
}

#[actix_web::test]
async fn category_matches_tags_and_category() {
    let (_, vendors) = get_json("/api/v1/vendors?category=dairy", RankingSettings::default()).await;
    assert_eq!(ids(&vendors), vec!["m-near"]);

    let (_, products) =
        get_json("/api/v1/products?category=DAIRY", RankingSettings::default()).await;
    assert_eq!(ids(&products), vec!["p-milk"]);
    assert_eq!(products[0]["price"], json!(32));
}

#[actix_web::test]
async fn shuffle_off_keeps_store_order() {
    let (_, body) = get_json("/api/v1/vendors?shuffle=0", RankingSettings::default()).await;
    assert_eq!(ids(&body), vec!["m-near", "r-far", "r-mid", "r-near"]);

    let (_, body) = get_json("/api/v1/products?shuffle=false", RankingSettings::default()).await;
    assert_eq!(ids(&body), vec!["p-bread", "p-milk"]);
}

#[actix_web::test]
async fn limit_is_capped() {
    let settings = RankingSettings {
        max_limit: 2,
        ..Default::default()
    };
    let (_, body) = get_json("/api/v1/vendors?limit=100&shuffle=0", settings).await;
    assert_eq!(ids(&body), vec!["m-near", "r-far"]);

    let (_, body) = get_json("/api/v1/vendors?limit=1", RankingSettings::default()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn invalid_location_still_lists_everything() {
    let (status, body) = get_json(
        "/api/v1/vendors?latitude=200&longitude=77.6",
        RankingSettings::default(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let mut found = ids(&body);
    found.sort();
    assert_eq!(found, vec!["m-near", "r-far", "r-mid", "r-near"]);
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item.get("distance").is_none()));
}

#[actix_web::test]
async fn featured_only_filter() {
    let (_, body) = get_json("/api/v1/vendors?featured=true", RankingSettings::default()).await;
    assert_eq!(ids(&body), vec!["r-mid"]);
}

#[actix_web::test]
async fn unknown_vendor_type_is_bad_request() {
    let (status, body) = get_json("/api/v1/vendors?type=bakery", RankingSettings::default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!(400));
}

#[actix_web::test]
async fn unrecognized_shuffle_value_uses_default() {
    let (status, body) =
        get_json("/api/v1/products?shuffle=maybe", RankingSettings::default()).await;
    assert_eq!(status, StatusCode::OK);
    let mut found = ids(&body);
    found.sort();
    assert_eq!(found, vec!["p-bread", "p-milk"]);
}

#[actix_web::test]
async fn short_and_full_coordinate_names_in_one_query() {
    // latitude wins over lat, so the user is at MG Road rather than (1, 77.6)
    let (status, body) = get_json(
        "/api/v1/vendors?type=restaurant&lat=1.0&latitude=12.9750&lng=77.6060&lon=0",
        RankingSettings::default(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["r-near", "r-mid"]);
}

#[actix_web::test]
async fn request_logging_middleware_passes_errors_through() {
    let (status, body) = get_json("/api/v1/vendors?type=bakery", RankingSettings::default()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("bakery"));
}
