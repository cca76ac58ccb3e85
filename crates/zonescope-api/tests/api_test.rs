mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{encode_geotiff, session_with_store, StubGeocoder, AREA_GEOJSON};
use serde_json::{json, Value};
use tower::ServiceExt;
use zonescope_api::{create_router, AppState};
use zonescope_core::config::LayeredConfig;
use zonescope_core::ports::GeocodeMatch;

fn app() -> Router {
    let (session, _store) = session_with_store();
    let place = GeocodeMatch { coordinates: [35.2137, 31.7683], display_name: "Jerusalem".to_string() };
    let session = session.with_geocoder(Arc::new(StubGeocoder::Found(place)));
    create_router(Arc::new(AppState::new(Arc::new(session))))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn multipart(file_name: &str, content: &[u8]) -> Request<Body> {
    let boundary = "zonescope-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post("/api/v1/layers")
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_analysis_lifecycle() {
    let app = app();

    let (status, _) = send(&app, get("/api/v1/analysis")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::post("/api/v1/analysis")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"coordinates": [[34.88, 32.0], [34.93, 32.0], [34.93, 32.05], [34.88, 32.05], [34.88, 32.0]]})
                .to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["no_fly_zones"], json!(["Ben Gurion Airport"]));
    // Two-decimal display strings next to the raw values
    let area = body["area"].as_str().unwrap();
    assert_eq!(area.split('.').nth(1).map(str::len), Some(2));
    assert!(body["area_m2"].as_f64().unwrap() > 0.0);

    let (status, _) = send(&app, Request::post("/api/v1/analysis/send").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Request::delete("/api/v1/analysis").body(Body::empty()).unwrap()).await;
    assert_eq!(body["dismissed"], true);

    let (status, _) = send(&app, Request::post("/api/v1/analysis/send").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The drawn shape stays as a layer
    let (_, layers) = send(&app, get("/api/v1/layers")).await;
    assert_eq!(layers.as_array().unwrap().len(), 1);
    assert!(layers[0]["key"].as_str().unwrap().starts_with("drawn-layer-"));
}

#[tokio::test]
async fn test_upload_and_remove_layer() {
    let app = app();

    let (status, body) = send(&app, multipart("area.geojson", AREA_GEOJSON.as_bytes())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["key"], "area.geojson");
    assert_eq!(body["kind"], "vector");

    let (_, layers) = send(&app, get("/api/v1/layers")).await;
    assert_eq!(layers[0]["key"], "area.geojson");
    assert_eq!(layers[0]["feature_count"], 1);
    // The listing carries what is needed to draw the layer
    assert_eq!(layers[0]["document"]["type"], "FeatureCollection");
    assert_eq!(layers[0]["document"]["features"][0]["geometry"]["type"], "Polygon");
    assert_eq!(layers[0]["style"]["color"], "blue");
    assert!(layers[0].get("raster").is_none());

    let (status, layer) = send(&app, get("/api/v1/layers/area.geojson")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(layer, layers[0]);

    let (_, status_body) = send(&app, get("/api/v1/status")).await;
    assert_eq!(status_body["layer_count"], 1);
    assert_eq!(status_body["busy"], false);
    assert_eq!(status_body["zones_available"], true);

    let request = Request::delete("/api/v1/layers/area.geojson").body(Body::empty()).unwrap();
    let (_, body) = send(&app, request).await;
    assert_eq!(body["removed"], true);

    let request = Request::delete("/api/v1/layers/area.geojson").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], false);

    let (status, _) = send(&app, get("/api/v1/layers/area.geojson")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_raster_layer_listing() {
    let app = app();

    let (status, body) = send(&app, multipart("scan.tif", &encode_geotiff(4, 3))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["kind"], "raster");

    let (_, layer) = send(&app, get("/api/v1/layers/scan.tif")).await;
    assert_eq!(layer["kind"], "raster");
    assert!(layer.get("document").is_none());

    let raster = &layer["raster"];
    assert_eq!(raster["width"], 4);
    assert_eq!(raster["height"], 3);
    assert_eq!(raster["bands"], 1);
    assert_eq!(raster["epsg"], 4326);
    assert_eq!(raster["band_ranges"], json!([[0.0, 11.0]]));
    assert_eq!(raster["opacity"], 0.7);
    assert_eq!(raster["resolution"], 256);
}

#[tokio::test]
async fn test_zones_are_served_in_red() {
    let (status, body) = send(&app(), get("/api/v1/zones")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["style"]["color"], "red");
    assert_eq!(body["style"]["fill_opacity"], 0.2);

    let features = body["zones"]["features"].as_array().unwrap();
    let names: Vec<&str> = features.iter().map(|f| f["properties"]["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Ben Gurion Airport", "Knesset"]);
    assert_eq!(features[0]["geometry"]["type"], "MultiPolygon");
}

#[tokio::test]
async fn test_upload_failures_are_categorized() {
    let app = app();

    let (status, body) = send(&app, multipart("notes.txt", b"hello")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["category"], "unsupported_format");

    let (status, body) = send(&app, multipart("scan.tif", b"not a raster")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["category"], "malformed_raster");

    let (status, body) = send(&app, multipart("area.geojson", b"{\"type\": \"Polygon\"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["category"], "malformed_vector");

    let (_, layers) = send(&app, get("/api/v1/layers")).await;
    assert!(layers.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search() {
    let (status, body) = send(&app(), get("/api/v1/search?q=Jerusalem")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["display_name"], "Jerusalem");
    assert_eq!(body["result"]["coordinates"], json!([35.2137, 31.7683]));
}

#[tokio::test]
async fn test_missing_zone_dataset_returns_unavailable() {
    let mut config = LayeredConfig::with_defaults();
    config.zones_path.value = "/nonexistent/zones.geojson".into();
    let app = create_router(Arc::new(AppState::from_config(&config).unwrap()));

    let request = Request::post("/api/v1/analysis")
        .header("content-type", "application/json")
        .body(Body::from(json!({"coordinates": [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]}).to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["category"], "zone_dataset_unavailable");

    let (_, status_body) = send(&app, get("/api/v1/status")).await;
    assert_eq!(status_body["zones_available"], false);

    let (status, _) = send(&app, get("/api/v1/zones")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
