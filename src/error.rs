use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::ModelError;

/// Every way a prediction request can fail. The status code and the message
/// shown to the client are derived from the variant alone.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Only POST method is allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Decode(#[from] image::ImageError),
    #[error("{0}")]
    Inference(#[from] ModelError),
    #[error("{0}")]
    Internal(String),
}

impl PredictError {
    pub fn no_file() -> Self {
        Self::Validation("No file provided in the request".to_string())
    }

    pub fn not_an_image() -> Self {
        Self::Validation("Uploaded file is not an image".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Decode(_) | Self::Inference(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the response body.
    pub fn client_message(&self) -> String {
        if self.status().is_server_error() {
            format!("Unexpected error: {self}")
        } else {
            self.to_string()
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
