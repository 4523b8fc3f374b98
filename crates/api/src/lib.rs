pub mod config;
mod rate_limit;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use hotel_assistant::{
    BookingAssistant, BookingError, ChatError, HotelProfile, QuoteRequest, TextGenerator,
};
use hotel_core::{BookingRequest, ChatInput, ReservationError};
use hotel_observability::AppMetrics;
use hotel_storage::{Store, DEFAULT_RECENT_LIMIT};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use crate::config::ApiConfig;
pub use crate::rate_limit::{Admission, SlidingWindowLimiter};

const MAX_BODY_BYTES: usize = 64 * 1024;
const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct ApiState {
    pub assistant: Arc<BookingAssistant<Store>>,
    pub metrics: Arc<AppMetrics>,
    pub limiter: SlidingWindowLimiter,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: hotel_observability::MetricsSnapshot,
    capabilities: HealthCapabilities,
}

#[derive(Debug, Serialize)]
struct HealthCapabilities {
    generative_chat: bool,
    persistent_store: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteBody {
    room_type: Option<String>,
    check_in: Option<String>,
    check_out: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReservationCreated {
    success: bool,
    reservation_id: i64,
    total_price: u64,
    nights: u32,
    message: String,
}

/// Builds the application from `HOTEL_*` environment variables.
pub async fn build_app() -> Result<Router> {
    build_app_with(ApiConfig::from_env()?).await
}

pub async fn build_app_with(config: ApiConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();

    let store = match config.database_url.as_deref() {
        Some(database_url) => Store::sqlite(database_url).await?,
        None => Store::memory(),
    };

    let generator = match config.gemini.clone() {
        Some(gemini) => TextGenerator::gemini(gemini)?,
        None => TextGenerator::Offline,
    };

    info!(
        rooms = config.catalog.len(),
        generator = %generator.name(),
        persistent_store = store.is_persistent(),
        "hotel api configured"
    );

    let assistant = Arc::new(BookingAssistant::new(
        config.catalog,
        HotelProfile::default(),
        generator,
        Arc::new(store),
        metrics.clone(),
    ));

    let limiter = SlidingWindowLimiter::new(config.rate_limit_window, config.rate_limit_max);
    spawn_limiter_pruning(limiter.clone());

    let state = ApiState {
        assistant,
        metrics,
        limiter,
        allowed_origins: Arc::new(config.allowed_origins),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/rooms", get(rooms_list))
        .route("/v1/rooms/:room_type", get(room_get))
        .route("/v1/pricing/quote", post(pricing_quote))
        .route(
            "/v1/reservations",
            get(reservations_list).post(reservation_create),
        )
        .route("/v1/chat", post(chat))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_metrics_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        capabilities: HealthCapabilities {
            generative_chat: state.assistant.generator().is_remote(),
            persistent_store: state.assistant.store().is_persistent(),
        },
    };

    (StatusCode::OK, Json(payload))
}

async fn rooms_list(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.assistant.catalog().clone())
}

async fn room_get(State(state): State<ApiState>, Path(room_type): Path<String>) -> Response {
    match state.assistant.room(&room_type) {
        Some((_, room)) => (StatusCode::OK, Json(room.clone())).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "room_not_found",
            format!("room type `{}` does not exist", room_type),
        ),
    }
}

async fn pricing_quote(
    State(state): State<ApiState>,
    body: Result<Json<QuoteBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection),
    };
    let request = match (body.room_type, body.check_in, body.check_out) {
        (Some(room_type), Some(check_in), Some(check_out)) => QuoteRequest {
            room_type,
            check_in,
            check_out,
        },
        (room_type, check_in, _) => {
            let field = if room_type.is_none() {
                "room_type"
            } else if check_in.is_none() {
                "check_in"
            } else {
                "check_out"
            };
            return error_response(
                StatusCode::BAD_REQUEST,
                "missing_field",
                format!("missing required field: {}", field),
            );
        }
    };

    match state.assistant.quote(&request) {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(error) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "quote_rejected",
                "kind": error.kind(),
                "message": error.to_string()
            })),
        )
            .into_response(),
    }
}

async fn reservation_create(
    State(state): State<ApiState>,
    request: Result<Json<BookingRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return body_rejected(rejection),
    };
    match state.assistant.book(request).await {
        Ok(confirmation) => {
            let id = confirmation.reservation.id;
            (
                StatusCode::OK,
                Json(ReservationCreated {
                    success: true,
                    reservation_id: id,
                    total_price: confirmation.reservation.total_price,
                    nights: confirmation.quote.nights,
                    message: format!("Reservation confirmed! ID: {}", id),
                }),
            )
                .into_response()
        }
        Err(BookingError::Rejected(ReservationError::Quote(error))) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "quote_rejected",
                "kind": error.kind(),
                "message": error.to_string()
            })),
        )
            .into_response(),
        Err(BookingError::Rejected(error)) => {
            error_response(StatusCode::BAD_REQUEST, error.kind(), error.to_string())
        }
        Err(BookingError::Storage(cause)) => {
            error!(error = %format!("{cause:#}"), "reservation insert failed");
            internal_error()
        }
    }
}

async fn reservations_list(State(state): State<ApiState>) -> Response {
    match state
        .assistant
        .recent_reservations(DEFAULT_RECENT_LIMIT)
        .await
    {
        Ok(reservations) => (StatusCode::OK, Json(reservations)).into_response(),
        Err(cause) => {
            error!(error = %format!("{cause:#}"), "reservation listing failed");
            internal_error()
        }
    }
}

async fn chat(
    State(state): State<ApiState>,
    input: Result<Json<ChatInput>, JsonRejection>,
) -> Response {
    let Json(input) = match input {
        Ok(input) => input,
        Err(rejection) => return body_rejected(rejection),
    };
    match state.assistant.handle_chat(input).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(ChatError::EmptyMessage) => error_response(
            StatusCode::BAD_REQUEST,
            "empty_message",
            "message must not be empty",
        ),
    }
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "message": message.into()
        })),
    )
        .into_response()
}

/// Oversized bodies keep their 413; any other unreadable body is a 400.
fn body_rejected(rejection: JsonRejection) -> Response {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            rejection.body_text(),
        );
    }
    error_response(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

fn internal_error() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "unexpected server error",
    )
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:5173")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

fn spawn_limiter_pruning(limiter: SlidingWindowLimiter) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(LIMITER_PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            limiter.prune();
        }
    });
}

async fn request_metrics_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    state.metrics.inc_request();
    let response = next.run(request).await;
    state.metrics.observe_latency(started.elapsed());
    response
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    match state.limiter.check(&ip) {
        Admission::Allowed => next.run(request).await,
        Admission::Limited { retry_after } => {
            let mut response = error_response(
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "too many requests, slow down",
            );
            let seconds = retry_after.as_secs().max(1).to_string();
            if let Ok(value) = HeaderValue::from_str(&seconds) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    response
}
