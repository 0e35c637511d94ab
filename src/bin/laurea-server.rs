//! HTTP front for the diploma generator.
//!
//! One POST route accepts the caller's field JSON and returns the generated
//! deck as a downloadable attachment. All composition logic lives in the
//! `laurea` library; this binary only translates between HTTP and the
//! generator's inputs and errors.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use laurea::compose::{ComposeConfig, DiplomaGenerator, FieldValues};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// MIME type of a generated .pptx attachment.
const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

struct AppState {
    generator: DiplomaGenerator,
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let template_path = std::env::var("LAUREA_TEMPLATE")
        .unwrap_or_else(|_| "assets/diploma_template.pptx".to_string());
    let icon_path =
        std::env::var("LAUREA_ICON").unwrap_or_else(|_| "assets/star.png".to_string());
    let addr = std::env::var("LAUREA_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let config = ComposeConfig::diploma(template_path.into(), icon_path.into());
    let state = Arc::new(AppState {
        generator: DiplomaGenerator::new(config),
    });

    let app = Router::new()
        .route("/", get(health))
        .route("/generate-diploma", post(generate_diploma))
        .with_state(state);

    tracing::info!(%addr, "starting diploma service");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind");
            std::process::exit(1);
        },
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

/// Generate a diploma from the posted field mapping.
///
/// Field values arrive as strings or numbers; numbers are stringified before
/// coercion so `{"rating_count": 3}` and `{"rating_count": "3"}` behave the
/// same. Nulls and structured values are ignored.
async fn generate_diploma(
    State(state): State<Arc<AppState>>,
    Json(body): Json<HashMap<String, Value>>,
) -> Response {
    tracing::info!(fields = ?body.keys().collect::<Vec<_>>(), "generation request");

    let mut values = FieldValues::new();
    for (name, value) in &body {
        match value {
            Value::String(s) => values.insert(name, s.clone()),
            Value::Number(n) => values.insert(name, n.to_string()),
            Value::Null => {},
            other => {
                tracing::warn!(field = %name, value = %other, "ignoring non-scalar field value");
            },
        }
    }

    match state.generator.generate(&values) {
        Ok(diploma) => {
            tracing::info!(filename = %diploma.filename, bytes = diploma.bytes.len(), "diploma generated");
            (
                [
                    (header::CONTENT_TYPE, PPTX_CONTENT_TYPE.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", diploma.filename),
                    ),
                ],
                diploma.bytes,
            )
                .into_response()
        },
        Err(e) => {
            tracing::error!(error = %e, "generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        },
    }
}
