use crate::app_error::AppError;
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code().as_str();

        match self {
            // Storage details stay in the logs.
            AppError::ProfileLookupFailed(ref detail) | AppError::StorageUpdateFailed(ref detail) => {
                tracing::error!(code, detail = %detail, "Webhook request failed");
            }
            AppError::Internal(ref detail) => {
                tracing::error!(code, detail = %detail, "Webhook request failed");
                return error_resp(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            }
            _ => {
                tracing::warn!(code, error = %self, "Webhook request rejected");
            }
        }

        let message = match &self {
            AppError::ProfileLookupFailed(_) => "Profile lookup failed".to_string(),
            AppError::StorageUpdateFailed(_) => "Failed to update subscription".to_string(),
            other => other.to_string(),
        };

        error_resp(StatusCode::BAD_REQUEST, &message)
    }
}

fn error_resp(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
