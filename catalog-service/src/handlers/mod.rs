use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::CatalogError;

pub mod groups;
pub mod health;
pub mod members;
pub mod validation;

/// Success body for the write endpoints.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

/// Failure body: a fixed per-endpoint message plus the error's display
/// rendering. Upstream payloads and stack traces stay in the logs.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
}

/// Handler-level error wrapping the underlying catalog error with the
/// endpoint's failure message.
#[derive(Debug)]
pub struct ApiError {
    message: &'static str,
    source: CatalogError,
}

impl ApiError {
    pub fn new(message: &'static str, source: CatalogError) -> Self {
        Self { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.source.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            message: self.message.to_string(),
            error: self.source.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validation_errors_map_to_400() {
        let error = ApiError::new(
            "Failed to upload",
            CatalogError::InvalidInput("No image file provided".to_string()),
        );
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "Failed to upload");
        assert_eq!(json["error"], "Invalid input: No image file provided");
    }

    #[tokio::test]
    async fn test_upload_errors_map_to_500() {
        let error = ApiError::new(
            "Failed to upload",
            CatalogError::Upload("remote host returned 401".to_string()),
        );
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
