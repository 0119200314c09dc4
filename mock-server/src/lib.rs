//! Stub of the VitalStack backend for local development and tests.
//!
//! Serves the nutrition scan route with a canned analysis instead of calling
//! a vision model. DTOs are defined independently of `vital-core` so the
//! integration tests catch drift between the two.

use std::{future::IntoFuture, io, pin::pin, sync::Arc, time::Duration};

use axum::{
    extract::Request,
    http::{
        header::{CONTENT_TYPE, HeaderName},
        HeaderValue, Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
    sync::Notify,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

pub mod config;

pub use config::{Config, ConfigError};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanInput {
    pub image_base64: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScanOutput {
    pub food_name: String,
    pub confidence: f64,
    pub macros: MacroData,
    pub serving_size: String,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct MacroData {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub weight_grams: f64,
    pub macros: MacroData,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorModel {
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub errors: Vec<ErrorDetail>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub location: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation {
        message: String,
        location: String,
        value: serde_json::Value,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        let (status, errors) = match self {
            AppError::Validation {
                message,
                location,
                value,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                vec![ErrorDetail {
                    message,
                    location,
                    value,
                }],
            ),
        };
        let body = ErrorModel {
            title: status.canonical_reason().unwrap_or_default().to_string(),
            status: status.as_u16(),
            detail,
            errors,
        };

        (
            status,
            [(CONTENT_TYPE, "application/problem+json")],
            Json(body),
        )
            .into_response()
    }
}

/// Routes without CORS, as used by tests.
pub fn app() -> Router {
    Router::new()
        .route("/api/nutrition/scan", post(scan_food))
        .layer(middleware::from_fn(request_id))
}

/// Routes with CORS restricted to the configured origins.
pub fn app_with(config: &Config) -> Router {
    let origins = config
        .origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok());
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id])
        .max_age(Duration::from_secs(60 * 60));

    app().layer(cors)
}

pub async fn run(listener: TcpListener) -> Result<(), io::Error> {
    axum::serve(listener, app()).await
}

/// Serve until Ctrl-C or SIGTERM, then give in-flight requests up to
/// `config.shutdown_timeout` to finish.
pub async fn serve(listener: TcpListener, config: Config) -> Result<(), io::Error> {
    let stopping = Arc::new(Notify::new());
    let signal_seen = stopping.clone();

    let server = axum::serve(listener, app_with(&config))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            signal_seen.notify_one();
        })
        .into_future();
    let mut server = pin!(server);

    tokio::select! {
        res = &mut server => return res,
        _ = stopping.notified() => {}
    }

    match tokio::time::timeout(config.shutdown_timeout, server).await {
        Ok(res) => res,
        Err(_) => {
            warn!(
                timeout_secs = config.shutdown_timeout.as_secs(),
                "Shutdown grace period elapsed, dropping open connections"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Echo the caller's request id, or mint one.
async fn request_id(request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn scan_food(Json(input): Json<ScanInput>) -> Result<Json<ScanOutput>, AppError> {
    info!(
        image_size_bytes = input.image_base64.len(),
        description = input.description.as_deref().unwrap_or(""),
        "received food scan request"
    );

    if input.image_base64.is_empty() {
        return Err(AppError::Validation {
            message: "expected length >= 1".to_string(),
            location: "body.image_base64".to_string(),
            value: serde_json::Value::String(String::new()),
        });
    }

    Ok(Json(grilled_chicken_salad()))
}

fn macros(calories: i64, protein: f64, carbs: f64, fat: f64, fiber: f64) -> MacroData {
    MacroData {
        calories,
        protein,
        carbs,
        fat,
        fiber,
    }
}

fn ingredient(name: &str, weight_grams: f64, macros: MacroData) -> Ingredient {
    Ingredient {
        name: name.to_string(),
        weight_grams,
        macros,
    }
}

/// The canned analysis every valid scan returns.
pub fn grilled_chicken_salad() -> ScanOutput {
    ScanOutput {
        food_name: "Grilled Chicken Salad".to_string(),
        confidence: 0.95,
        macros: macros(476, 47.0, 11.0, 27.0, 3.0),
        serving_size: "400g".to_string(),
        ingredients: vec![
            ingredient("Grilled Chicken Breast", 150.0, macros(248, 38.0, 0.0, 10.0, 0.0)),
            ingredient("Mixed Greens", 100.0, macros(20, 2.0, 3.0, 0.0, 2.0)),
            ingredient("Cherry Tomatoes", 60.0, macros(18, 1.0, 4.0, 0.0, 1.0)),
            ingredient("Feta Cheese", 40.0, macros(105, 6.0, 2.0, 8.0, 0.0)),
            ingredient("Olive Oil Dressing", 20.0, macros(80, 0.0, 1.0, 9.0, 0.0)),
            ingredient("Cucumber", 30.0, macros(5, 0.0, 1.0, 0.0, 0.0)),
        ],
    }
}
