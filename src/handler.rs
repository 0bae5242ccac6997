use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, FromRequest, Multipart, State},
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use image::{ColorType, DynamicImage};
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::PredictError;
use crate::predictor::{Prediction, Predictor};

pub struct AppState {
    pub predictor: Predictor,
}

/// The uploaded `file` part of a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// What the handler needs from an HTTP request, independent of the framework.
#[derive(Debug, Clone)]
pub struct PredictRequest {
    pub method: Method,
    pub file: Option<Upload>,
}

#[derive(Serialize)]
struct PredictResponse {
    success: bool,
    result: Prediction,
}

pub fn router(state: Arc<AppState>, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/predict", any(predict_handler))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
}

/// Validates the request, decodes the upload as RGB and runs the predictor.
pub fn classify(predictor: &Predictor, request: PredictRequest) -> Result<Prediction, PredictError> {
    if request.method != Method::POST {
        return Err(PredictError::MethodNotAllowed);
    }

    let file = request.file.ok_or_else(PredictError::no_file)?;

    let is_image = file
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("image/"));
    if !is_image {
        return Err(PredictError::not_an_image());
    }

    let mut image = image::load_from_memory(&file.bytes)?;
    if image.color() != ColorType::Rgb8 {
        image = DynamicImage::ImageRgb8(image.to_rgb8());
    }

    Ok(predictor.predict(&image)?)
}

async fn predict_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().clone();

    let file = if method == Method::POST {
        match read_file_field(request).await {
            Ok(file) => file,
            Err(err) => return failure(err),
        }
    } else {
        None
    };

    let predictor = state.predictor.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        classify(&predictor, PredictRequest { method, file })
    })
    .await
    .unwrap_or_else(|err| Err(PredictError::Internal(err.to_string())));

    match outcome {
        Ok(prediction) => {
            info!(
                class_id = prediction.class_id,
                class_name = %prediction.class_name,
                confidence = prediction.confidence,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "prediction served"
            );
            let body = PredictResponse {
                success: true,
                result: prediction,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => failure(err),
    }
}

fn failure(err: PredictError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        error!(%status, error = %err, "prediction failed");
    } else {
        warn!(%status, error = %err, "prediction rejected");
    }
    err.into_response()
}

/// Pulls the `file` part out of a multipart body. Only a part carrying a
/// filename counts as an upload, and a body that is not multipart at all has
/// no file.
async fn read_file_field(request: Request<Body>) -> Result<Option<Upload>, PredictError> {
    let Ok(mut multipart) = Multipart::from_request(request, &()).await else {
        return Ok(None);
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| PredictError::Validation(err.to_string()))?
    {
        if field.name() == Some("file") && field.file_name().is_some() {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| PredictError::Validation(err.to_string()))?;
            return Ok(Some(Upload {
                content_type,
                bytes,
            }));
        }
    }

    Ok(None)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK" }))
}
