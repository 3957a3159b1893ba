use super::common::*;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::quality::router::{
    by_grade_handler, create_handler, detail_handler, GradeQuery,
};

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn create_handler_returns_conflict_on_duplicate() {
    let service = Arc::new(service_with(ConflictStore));

    let response = create_handler::<ConflictStore>(
        State(service),
        axum::Json(snapshot("AMX-100", EXCELLENT, 30, "Accepted", "MedSupply")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_handler_returns_internal_error_on_store_failure() {
    let service = Arc::new(service_with(UnavailableStore));

    let response = create_handler::<UnavailableStore>(
        State(service),
        axum::Json(snapshot("AMX-100", EXCELLENT, 30, "Accepted", "MedSupply")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("database offline"));
}

#[tokio::test]
async fn detail_handler_returns_not_found_for_unknown_batches() {
    let (service, _) = build_service();

    let response =
        detail_handler::<MemoryStore>(State(Arc::new(service)), Path("NOPE".to_string())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn by_grade_handler_treats_missing_grade_as_invalid() {
    let (service, _) = seeded_service();

    let response = by_grade_handler::<MemoryStore>(
        State(Arc::new(service)),
        Query(GradeQuery { grade: None }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_route_derives_and_returns_the_record() {
    let (service, store) = build_service();
    let router = router_with_service(service);

    let body = json!({
        "batch_number": "VIT-500",
        "name": "Vitamin C",
        "temperature": 36.0,
        "humidity": 50.0,
        "ph_level": 7.0,
        "contaminant_level": 0.02,
        "active_ingredient_purity": 99.5,
        "expiry_date": "2026-06-30",
        "accepted_or_rejected": "Accepted",
        "supplier": "Acme Labs"
    });
    let response = router
        .oneshot(
            Request::post("/api/v1/batches")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["quality_score"], json!(64.0));
    assert_eq!(payload["quality_grade"], json!("D"));
    assert_eq!(payload["quality_status"], json!("Poor"));
    assert_eq!(payload["status"], json!("quarantine"));
    assert_eq!(payload["alerts"][0]["type"], json!("temperature"));
    assert_eq!(payload["alerts"][0]["severity"], json!("critical"));
    assert_eq!(payload["alerts"][0]["threshold"], json!(35.0));
    assert_eq!(payload["category"], json!("General"));
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn blank_batch_number_is_unprocessable() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/batches")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "batch_number": "" }).to_string()))
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn detail_route_includes_expiry_helpers() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(get("/api/v1/batches/AMX-200"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["batch_number"], json!("AMX-200"));
    assert_eq!(payload["days_until_expiry"], json!(20));
    assert_eq!(payload["expiry_status"], json!("warning"));
    assert_eq!(payload["is_expired"], json!(false));
    assert_eq!(
        payload["score_breakdown"]
            .as_array()
            .map(Vec::len)
            .unwrap_or_default(),
        5
    );
}

#[tokio::test]
async fn replace_and_delete_routes_round_trip() {
    let (service, store) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(
            Request::put("/api/v1/batches/AMX-100")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "batch_number": "AMX-100",
                        "temperature": 22.0,
                        "humidity": 50.0,
                        "ph_level": 7.0,
                        "contaminant_level": 1.5,
                        "active_ingredient_purity": 99.5,
                        "expiry_date": "2026-06-30"
                    })
                    .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("quarantine"));
    assert_eq!(payload["quality_grade"], json!("C"));

    let response = router
        .clone()
        .oneshot(
            Request::delete("/api/v1/batches/AMX-100")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store
        .records
        .lock()
        .expect("store mutex poisoned")
        .get("AMX-100")
        .is_none());

    let response = router
        .oneshot(get("/api/v1/batches/AMX-100"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_route_applies_search() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(get("/api/v1/batches?search=acme"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let numbers: Vec<&str> = payload
        .as_array()
        .expect("array payload")
        .iter()
        .filter_map(|batch| batch["batch_number"].as_str())
        .collect();
    assert_eq!(numbers, vec!["ASP-600", "VIT-500"]);
}

#[tokio::test]
async fn import_route_accepts_csv_bodies() {
    let (service, store) = build_service();
    let router = router_with_service(service);

    let csv = "batch_number,temperature,humidity,ph_level,contaminant_level,active_ingredient_purity\n\
AMX-100,22,50,7.0,0.0005,99.5\n\
,22,50,7.0,0.0005,99.5\n";
    let response = router
        .oneshot(
            Request::post("/api/v1/batches/import")
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from(csv))
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["imported"], json!(1));
    assert_eq!(payload["failed"], json!(1));
    assert_eq!(payload["errors"][0]["row"], json!(3));
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn refresh_route_honours_dry_run() {
    let (service, store) = seeded_service();
    let router = router_with_service(service);
    let writes = store.writes();

    let response = router
        .oneshot(
            Request::post("/api/v1/batches/refresh?dry_run=true")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["dry_run"], json!(true));
    assert_eq!(payload["total"], json!(6));
    assert_eq!(payload["updated"], json!(0));
    assert_eq!(store.writes(), writes);
}

#[tokio::test]
async fn statistics_route_reports_distributions() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(get("/api/v1/quality/statistics"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_records"], json!(6));
    assert_eq!(payload["grade_distribution"]["C"], json!(0));
    assert_eq!(payload["status_distribution"]["Excellent"], json!(2));
    assert_eq!(payload["lifecycle_distribution"]["quarantine"], json!(2));
}

#[tokio::test]
async fn performer_routes_respect_n() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get("/api/v1/quality/top-performers?n=1"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(payload[0]["batch_number"], json!("AMX-100"));

    let response = router
        .oneshot(get("/api/v1/quality/poor-performers"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(5));
    assert_eq!(payload[0]["batch_number"], json!("IBU-400"));
}

#[tokio::test]
async fn invalid_query_parameters_return_bad_request() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    for uri in [
        "/api/v1/quality/by-grade?grade=Z",
        "/api/v1/quality/alerts?severity=severe",
        "/api/v1/quality/alerts?type=noise",
        "/api/v1/quality/acceptance?date_from=2025-09-10&date_to=2025-09-01",
    ] {
        let response = router
            .clone()
            .oneshot(get(uri))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let payload = read_json_body(response).await;
        assert!(payload.get("error").is_some(), "{uri}");
    }
}

#[tokio::test]
async fn alert_routes_summarise_and_list() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get("/api/v1/quality/alerts/count"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_alerts"], json!(8));
    assert_eq!(payload["by_type"]["phLevel"], json!(1));

    let response = router
        .oneshot(get("/api/v1/quality/alerts?severity=critical&limit=1"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
    assert_eq!(payload[0]["batch_number"], json!("IBU-400"));
    assert_eq!(payload[0]["critical_count"], json!(4));
}

#[tokio::test]
async fn acceptance_route_reports_rates() {
    let (service, _) = seeded_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(get(
            "/api/v1/quality/acceptance?date_from=2025-10-01&date_to=2025-10-01",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total"], json!(6));
    assert_eq!(payload["acceptance_rate"], json!(66.67));
    assert_eq!(payload["by_supplier"][0]["supplier"], json!("Acme Labs"));
}

#[tokio::test]
async fn report_routes_surface_store_outages() {
    let router =
        crate::workflows::quality::quality_router(Arc::new(service_with(UnavailableStore)));

    let response = router
        .oneshot(get("/api/v1/quality/scores"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
