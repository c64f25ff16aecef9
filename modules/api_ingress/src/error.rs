use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every error response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// HTTP status code
    pub code: u16,
    /// RFC3339 timestamp when the error occurred
    pub timestamp: String,
    /// Request ID, when the caller knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id: None,
        }
    }

    pub fn with_request_id(
        error: impl Into<String>,
        code: u16,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            request_id: Some(request_id.into()),
            ..Self::new(error, code)
        }
    }
}

/// Error type returned by REST handlers.
///
/// `Internal` keeps the underlying failure for the log and only exposes
/// `message` to the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Internal { message, source } => tracing::error!(
                error = %message,
                cause = %format!("{source:#}"),
                status = status.as_u16(),
                "request failed"
            ),
            other => tracing::warn!(
                error = %other,
                status = status.as_u16(),
                "request failed"
            ),
        }

        let body = ErrorResponse::new(self.to_string(), status.as_u16());
        let mut response = (status, Json(body.clone())).into_response();
        // Picked up by the request-id middleware, which stamps the id on the body
        response.extensions_mut().insert(body);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_error_hides_source() {
        let err = AppError::internal(
            "Failed to get customers",
            anyhow::anyhow!("connection refused to 10.0.0.1"),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to get customers");
        assert_eq!(json["code"], 500);
        assert!(json["timestamp"].is_string());
        assert!(json.get("request_id").is_none());
        assert!(!json.to_string().contains("10.0.0.1"));
    }

    #[test]
    fn error_body_is_left_in_response_extensions() {
        let response = AppError::BadRequest("Validation failed: name: is required".into())
            .into_response();
        let body = response
            .extensions()
            .get::<ErrorResponse>()
            .expect("error body in extensions");
        assert_eq!(body.code, 400);
        assert_eq!(body.error, "Validation failed: name: is required");
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let response = AppError::NotFound("Customer not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Customer not found");
        assert_eq!(json["code"], 404);
    }

    #[test]
    fn error_response_with_request_id_serializes_it() {
        let body = ErrorResponse::with_request_id("Not found", 404, "rid-1");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["request_id"], "rid-1");
        assert_eq!(json["code"], 404);
    }
}
