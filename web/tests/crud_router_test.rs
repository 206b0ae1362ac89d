//! The generic router against a fully wired schedule.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use axum::{http::StatusCode, Router};
use axum_test::TestServer;
use flight_schedule_testing::fixtures;
use flight_schedule_web::{correlation_id_layer, crud_router, Access, CORRELATION_ID_HEADER};
use serde_json::{json, Value};

async fn server() -> TestServer {
    let schedule = fixtures::reference_schedule().await.unwrap();
    let app = Router::new()
        .nest("/api/Airline", crud_router(schedule.airlines.clone(), Access::ReadWrite))
        .nest("/api/Flight", crud_router(schedule.flights.clone(), Access::ReadWrite))
        .nest("/api/Gate", crud_router(schedule.gates.clone(), Access::ReadOnly))
        .layer(correlation_id_layer());
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_validation_errors_are_grouped_by_field() {
    let server = server().await;

    let response = server
        .post("/api/Airline")
        .json(&json!({
            "name": "Copycat",
            "iata": "CC",
            "icao": "AAL",
            "numberCode": "001",
            "sortDestinationID": 1
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["errors"]["ICAO"], json!(["The ICAO must be unique."]));
    assert_eq!(
        body["errors"]["NumberCode"],
        json!(["The number code must be unique unless the code is 000."])
    );
}

#[tokio::test]
async fn test_stale_put_is_conflict() {
    let server = server().await;
    let airline: Value = server.get("/api/Airline/Single/1").await.json();

    let mut first = airline.clone();
    first["description"] = json!("first");
    server.put("/api/Airline").json(&first).await.assert_status_ok();

    let mut second = airline;
    second["description"] = json!("second");
    let response = server.put("/api/Airline").json(&second).await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_gate_writes_are_not_allowed() {
    let server = server().await;

    server
        .post("/api/Gate")
        .json(&json!({ "name": "Z9" }))
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    server
        .delete("/api/Gate/1")
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);

    let count: usize = server.get("/api/Gate/Count").await.json();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let server = server().await;

    server
        .get("/api/Flight/Single/42")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/api/Airline/42")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_carry_correlation_id() {
    let server = server().await;
    let response = server.get("/api/Gate/All").await;

    response.assert_status_ok();
    assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
}
