//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use pv_sizing::api::{AppState, RemoteEndpoint, router};
use pv_sizing::config::ProjectConfig;
use pv_sizing::equipment::Catalog;
use pv_sizing::irradiance::RegionalTables;
use pv_sizing::project::dimension_project;

/// Dimension the residential preset and return the API state.
fn build_api_state(remote: Option<RemoteEndpoint>) -> Arc<AppState> {
    let catalog = Catalog::builtin();
    let report = dimension_project(&ProjectConfig::residential(), &catalog, &RegionalTables)
        .expect("residential preset is feasible");
    Arc::new(AppState {
        catalog,
        report,
        remote,
    })
}

async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
    send_to(build_api_state(None), req).await
}

async fn send_to(state: Arc<AppState>, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let app = router(state);
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn state_reports_best_configuration() {
    let req = Request::builder().uri("/state").body(Body::empty()).unwrap();
    let (status, json) = send(req).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["project"]["name"], "Residential rooftop");
    assert_eq!(json["project"]["target_from_consumption"], true);
    let best = &json["best"];
    assert!(best["module"].is_string());
    assert!(best["inverter"].is_string());
    assert!(json["performance"]["annual_generation_kwh"].as_f64().unwrap() > 0.0);
    assert!(json["financial"]["capital_cost"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn results_are_ranked() {
    let req = Request::builder().uri("/results").body(Body::empty()).unwrap();
    let (status, json) = send(req).await;
    assert_eq!(status, StatusCode::OK);

    let scores: Vec<f64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["score"]["total"].as_f64().unwrap())
        .collect();
    assert!(!scores.is_empty());
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn results_filtered_by_status() {
    let req = Request::builder()
        .uri("/results?min_status=good")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(req).await;
    assert_eq!(status, StatusCode::OK);

    for r in json.as_array().unwrap() {
        let s = r["compatibility_status"].as_str().unwrap();
        assert!(s == "excellent" || s == "good", "unexpected status {s}");
    }
}

#[tokio::test]
async fn dimension_accepts_a_project() {
    let mut config = serde_json::to_value(ProjectConfig::commercial()).unwrap();
    config["name"] = "Warehouse".into();
    let (status, json) = send(post_json("/dimension", &config)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["name"], "Warehouse");
    assert!(!json["results"].as_array().unwrap().is_empty());
    assert_eq!(json["target_power_kw"].as_f64(), Some(60.0));
}

#[tokio::test]
async fn dimension_rejects_invalid_project() {
    let mut config = serde_json::to_value(ProjectConfig::commercial()).unwrap();
    config["site"]["latitude"] = 120.0.into();
    config["losses"]["soiling"] = 2.0.into();
    let (status, json) = send(post_json("/dimension", &config)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"site.latitude"));
    assert!(fields.contains(&"losses.soiling"));
}

#[tokio::test]
async fn dimension_reports_infeasible_project() {
    let mut config = serde_json::to_value(ProjectConfig::commercial()).unwrap();
    config["sizing"]["max_inverters"] = 1.into();
    config["target"]["power_kw"] = 400.0.into();
    let (status, json) = send(post_json("/dimension", &config)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn dimension_refuses_client_chosen_remote_endpoint() {
    let mut config = serde_json::to_value(ProjectConfig::commercial()).unwrap();
    config["irradiance"]["source"] = "remote".into();
    config["irradiance"]["remote_url"] = "http://10.0.0.1:8080".into();
    config["irradiance"]["timeout_secs"] = u64::MAX.into();
    let (status, json) = send(post_json("/dimension", &config)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("remote irradiance"));
}

#[tokio::test]
async fn dimension_uses_server_remote_endpoint() {
    // The submitted timeout alone would fail validation. Nothing listens on
    // the discard port, so the regional tables answer.
    let state = build_api_state(Some(RemoteEndpoint {
        url: "http://127.0.0.1:9".into(),
        timeout_secs: 1,
    }));
    let mut config = serde_json::to_value(ProjectConfig::commercial()).unwrap();
    config["irradiance"]["source"] = "remote".into();
    config["irradiance"]["remote_url"] = "http://10.0.0.1:8080".into();
    config["irradiance"]["timeout_secs"] = u64::MAX.into();
    let (status, json) = send_to(state, post_json("/dimension", &config)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!json["results"].as_array().unwrap().is_empty());
}
