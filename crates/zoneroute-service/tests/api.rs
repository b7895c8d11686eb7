use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use zoneroute_service::{build_router, build_router_with_metrics};
use zoneroute_service_shared::test_utils::{empty_state, fixture_zones, test_state};

fn server() -> (TempDir, TestServer) {
    let (dir, state) = test_state();
    let server = TestServer::new(build_router(state)).expect("test server");
    (dir, server)
}

#[tokio::test]
async fn route_prefers_the_cheaper_detour() {
    let (_dir, server) = server();
    let response = server
        .post("/api/v1/route")
        .json(&json!({ "from": fixture_zones::CENTRO, "to": fixture_zones::SUR }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["path"], json!(["Centro", "Norte", "Puerto", "Sur"]));
    assert_eq!(body["total_minutes"], json!(14.0));
    assert_eq!(body["hops"], json!(3));
    assert_eq!(body["content_type"], "application/json");
}

#[tokio::test]
async fn route_to_unknown_zone_is_a_problem_with_suggestions() {
    let (_dir, server) = server();
    let response = server
        .post("/api/v1/route")
        .json(&json!({ "from": "Centro", "to": "Nort" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/unknown-zone");
    assert!(body["detail"].as_str().unwrap().contains("Norte"));
    assert!(body["instance"].as_str().is_some());
}

#[tokio::test]
async fn route_to_isolated_zone_is_not_found() {
    let (_dir, server) = server();
    let response = server
        .post("/api/v1/route")
        .json(&json!({ "from": "Centro", "to": fixture_zones::ISLA }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/route-not-found");
}

#[tokio::test]
async fn empty_route_fields_are_rejected() {
    let (_dir, server) = server();
    let response = server
        .post("/api/v1/route")
        .json(&json!({ "from": "", "to": "Sur" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/invalid-request");
}

#[tokio::test]
async fn reachability_lists_every_zone_once() {
    let (_dir, server) = server();
    let response = server
        .post("/api/v1/reachability")
        .json(&json!({ "from": fixture_zones::CENTRO }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["accessible"],
        json!(["Centro", "Hub Central", "Norte", "Puerto", "Sur"])
    );
    assert_eq!(body["inaccessible"], json!(["Isla"]));
}

#[tokio::test]
async fn reachability_from_unknown_zone_reaches_nothing() {
    let (_dir, server) = server();
    let response = server
        .post("/api/v1/reachability")
        .json(&json!({ "from": "Atlantida" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["accessible"], json!([]));
    assert_eq!(body["inaccessible"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn window_uses_a_strict_budget() {
    let (_dir, server) = server();
    let response = server
        .post("/api/v1/reachability/window")
        .json(&json!({ "from": fixture_zones::HUB_CENTRAL, "budget_minutes": 9 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let destinations = body["destinations"].as_array().unwrap();
    assert_eq!(destinations.len(), 1);
    assert_eq!(destinations[0]["zone"], "Centro");
    assert_eq!(destinations[0]["total_minutes"], json!(4.0));
}

#[tokio::test]
async fn window_rejects_non_positive_budget() {
    let (_dir, server) = server();
    let response = server
        .post("/api/v1/reachability/window")
        .json(&json!({ "from": "Centro", "budget_minutes": 0 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reopening_a_street_changes_the_next_route() {
    let (_dir, server) = server();
    server
        .post("/api/v1/connections/open")
        .json(&json!({ "from": "Centro", "to": "Sur" }))
        .await
        .assert_status_ok();

    let body: Value = server
        .post("/api/v1/route")
        .json(&json!({ "from": "Centro", "to": "Sur" }))
        .await
        .json();
    assert_eq!(body["path"], json!(["Centro", "Sur"]));
    assert_eq!(body["total_minutes"], json!(2.0));
}

#[tokio::test]
async fn closing_a_street_updates_reachability() {
    let (_dir, server) = server();
    let response = server
        .post("/api/v1/connections/close")
        .json(&json!({ "from": "Puerto", "to": "Sur" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("closed"));

    let body: Value = server
        .post("/api/v1/reachability")
        .json(&json!({ "from": "Centro" }))
        .await
        .json();
    assert_eq!(body["inaccessible"], json!(["Isla", "Sur"]));
}

#[tokio::test]
async fn closing_a_missing_street_is_not_found() {
    let (_dir, server) = server();
    let response = server
        .post("/api/v1/connections/close")
        .json(&json!({ "from": "Isla", "to": "Centro" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/connection-not-found");
}

#[tokio::test]
async fn travel_time_update_reroutes() {
    let (_dir, server) = server();
    server
        .put("/api/v1/connections/time")
        .json(&json!({ "from": "Centro", "to": "Puerto", "travel_minutes": 6 }))
        .await
        .assert_status_ok();

    let body: Value = server
        .post("/api/v1/route")
        .json(&json!({ "from": "Centro", "to": "Puerto" }))
        .await
        .json();
    assert_eq!(body["path"], json!(["Centro", "Puerto"]));
}

#[tokio::test]
async fn travel_time_must_be_positive() {
    let (_dir, server) = server();
    server
        .put("/api/v1/connections/time")
        .json(&json!({ "from": "Centro", "to": "Puerto", "travel_minutes": 0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn created_zone_is_listed_and_routable() {
    let (_dir, server) = server();
    server
        .post("/api/v1/zones")
        .json(&json!({
            "zone": { "name": "Hub Sur", "kind": "distribution_center", "vehicle_capacity": 3 },
            "connections": [
                { "source": "Hub Sur", "target": "Sur", "travel_minutes": 4, "direction": "two_way" }
            ]
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let listing: Value = server.get("/api/v1/zones").await.json();
    assert_eq!(listing["count"], json!(7));
    assert!(listing["zones"]
        .as_array()
        .unwrap()
        .iter()
        .any(|zone| zone["name"] == "Hub Sur" && zone["vehicle_capacity"] == 3));

    let body: Value = server
        .post("/api/v1/route")
        .json(&json!({ "from": "Hub Sur", "to": "Centro" }))
        .await
        .json();
    assert_eq!(body["path"], json!(["Hub Sur", "Sur", "Hub Central", "Centro"]));
    assert_eq!(body["total_minutes"], json!(15.0));
}

#[tokio::test]
async fn duplicate_zone_is_a_conflict() {
    let (_dir, server) = server();
    server
        .post("/api/v1/zones")
        .json(&json!({ "zone": { "name": "Centro", "kind": "standard", "category": "commercial" } }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn zone_linked_to_unknown_zone_is_not_found() {
    let (_dir, server) = server();
    server
        .post("/api/v1/zones")
        .json(&json!({
            "zone": { "name": "Oeste", "kind": "standard", "category": "residential" },
            "connections": [{ "source": "Oeste", "target": "Atlantida", "travel_minutes": 3 }]
        }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (_dir, server) = server();
    let response = server.get("/health/live").await;
    response.assert_status_ok();
    let header = response.header("x-request-id");
    assert_eq!(header.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn readiness_reports_loaded_network() {
    let (_dir, server) = server();
    let response = server.get("/health/ready").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["zones_loaded"], json!(6));
    assert_eq!(body["connections_loaded"], json!(8));
}

#[tokio::test]
async fn readiness_fails_for_empty_store() {
    let (_dir, state) = empty_state();
    let server = TestServer::new(build_router(state)).expect("test server");
    server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn metrics_are_served_on_the_configured_path() {
    let (_dir, state) = test_state();
    let server =
        TestServer::new(build_router_with_metrics(state, "/internal/metrics")).expect("test server");

    server.get("/internal/metrics").await.assert_status_ok();
    server
        .get("/metrics")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn connections_can_be_listed_by_traffic() {
    let (_dir, server) = server();

    let all: Value = server.get("/api/v1/connections").await.json();
    assert_eq!(all["count"], json!(8));

    let response = server
        .get("/api/v1/connections")
        .add_query_param("traffic", "heavy")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["traffic"], "heavy");
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["connections"][0]["source"], "Centro");
    assert_eq!(body["connections"][0]["target"], "Puerto");
}

#[tokio::test]
async fn blank_traffic_filter_is_rejected() {
    let (_dir, server) = server();
    server
        .get("/api/v1/connections")
        .add_query_param("traffic", "")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
