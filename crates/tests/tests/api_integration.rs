use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use hotel_api::{build_app_with, ApiConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    build_app_with(ApiConfig::default())
        .await
        .expect("app should build")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_capabilities() {
    let response = app().await.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let parsed = read_json(response).await;
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["capabilities"]["generative_chat"], false);
    assert_eq!(parsed["capabilities"]["persistent_store"], false);
}

#[tokio::test]
async fn rooms_are_listed_and_fetched_by_id() {
    let app = app().await;

    let response = app.clone().oneshot(get("/v1/rooms")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rooms = read_json(response).await;
    assert_eq!(rooms.as_object().unwrap().len(), 4);
    assert_eq!(rooms["doble"]["low_season_rate"], 28_000);

    let response = app
        .clone()
        .oneshot(get("/v1/rooms/triple_individual"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["capacity"], 3);

    let response = app.oneshot(get("/v1/rooms/suite")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], "room_not_found");
}

#[tokio::test]
async fn quote_prices_high_season_nights() {
    let response = app()
        .await
        .oneshot(post_json(
            "/v1/pricing/quote",
            json!({
                "room_type": "matrimonial",
                "check_in": "2025-01-05",
                "check_out": "2025-01-07"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["nights"], 2);
    assert_eq!(parsed["total_price"], 70_000);
    assert_eq!(parsed["average_nightly_price"], 35_000.0);
}

#[tokio::test]
async fn quote_rejections_carry_their_kind() {
    let app = app().await;

    let cases = [
        (
            json!({"room_type": "doble", "check_in": "2025-06-01", "check_out": "2025-06-01"}),
            "invalid_date_range",
        ),
        (
            json!({"room_type": "suite", "check_in": "2025-06-01", "check_out": "2025-06-02"}),
            "unknown_room_type",
        ),
        (
            json!({"room_type": "doble", "check_in": "01/06/2025", "check_out": "2025-06-02"}),
            "malformed_date",
        ),
    ];

    for (body, kind) in cases {
        let response = app
            .clone()
            .oneshot(post_json("/v1/pricing/quote", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let parsed = read_json(response).await;
        assert_eq!(parsed["error"], "quote_rejected");
        assert_eq!(parsed["kind"], kind);
    }

    let response = app
        .oneshot(post_json(
            "/v1/pricing/quote",
            json!({"room_type": "doble", "check_in": "2025-06-01"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "missing_field");
}

#[tokio::test]
async fn reservation_is_created_and_listed() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/reservations",
            json!({
                "guest_name": "Juan Pérez",
                "email": "juan@email.com",
                "phone": "+54 9 3537 123456",
                "room_type": "doble",
                "check_in": "2025-06-01",
                "check_out": "2025-06-04",
                "guests": 2
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let created = read_json(response).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["reservation_id"], 1);
    assert_eq!(created["total_price"], 84_000);
    assert_eq!(created["nights"], 3);

    let response = app.oneshot(get("/v1/reservations")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = read_json(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["guest_name"], "Juan Perez");
    assert_eq!(listed[0]["room_type"], "doble");
}

#[tokio::test]
async fn invalid_reservations_are_rejected() {
    let app = app().await;

    let base = json!({
        "guest_name": "Ana Martínez",
        "email": "ana@email.com",
        "phone": "+54 9 3537 111111",
        "room_type": "matrimonial",
        "check_in": "2025-06-01",
        "check_out": "2025-06-02",
        "guests": 2
    });

    let mut bad_email = base.clone();
    bad_email["email"] = json!("not-an-email");
    let mut too_many = base.clone();
    too_many["guests"] = json!(3);
    let mut no_name = base.clone();
    no_name.as_object_mut().unwrap().remove("guest_name");
    let mut backwards = base.clone();
    backwards["check_out"] = json!("2025-05-30");

    let cases = [
        (bad_email, "invalid_email"),
        (too_many, "invalid_guest_count"),
        (no_name, "missing_field"),
        (backwards, "quote_rejected"),
    ];

    for (body, error) in cases {
        let response = app
            .clone()
            .oneshot(post_json("/v1/reservations", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], error);
    }

    let response = app.oneshot(get("/v1/reservations")).await.unwrap();
    assert!(read_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chat_replies_offline_with_gallery() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/chat",
            json!({
                "message": "¿Cuánto cuesta la habitación matrimonial?",
                "history": [
                    {"role": "user", "content": "Hola"},
                    {"role": "bot", "content": "¡Hola! ¿En qué puedo ayudarte?"}
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert!(parsed["response"]
        .as_str()
        .unwrap()
        .contains("$25000 / $35000"));
    assert_eq!(parsed["images"], json!(["matrimonial"]));
    assert!(parsed["timestamp"].is_string());

    let response = app
        .oneshot(post_json("/v1/chat", json!({"message": "   "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "empty_message");
}

#[tokio::test]
async fn unreadable_bodies_get_a_json_error() {
    let app = app().await;

    let malformed = Request::builder()
        .method("POST")
        .uri("/v1/pricing/quote")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(malformed).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json")));
    assert_eq!(read_json(response).await["error"], "invalid_body");

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/reservations",
            json!({
                "guest_name": "Juan Pérez",
                "email": "juan@email.com",
                "phone": "+54 9 3537 123456",
                "room_type": "doble",
                "check_in": "2025-06-01",
                "check_out": "2025-06-04",
                "guests": "2"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed = read_json(response).await;
    assert_eq!(parsed["error"], "invalid_body");
    assert!(parsed["message"].as_str().unwrap().contains("guests"));

    let no_content_type = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .body(Body::from(r#"{"message": "hola"}"#))
        .unwrap();
    let response = app.oneshot(no_content_type).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "invalid_body");
}

#[tokio::test]
async fn oversized_bodies_are_refused() {
    let huge = "a".repeat(70 * 1024);
    let response = app()
        .await
        .oneshot(post_json("/v1/chat", json!({ "message": huge })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn clients_over_the_limit_get_429() {
    let config = ApiConfig {
        rate_limit_window: Duration::from_secs(60),
        rate_limit_max: 2,
        ..ApiConfig::default()
    };
    let app = build_app_with(config).await.expect("app should build");

    let request = || {
        Request::builder()
            .uri("/v1/rooms")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    assert_eq!(read_json(response).await["error"], "rate_limited");

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
