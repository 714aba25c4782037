//! Stripe webhook endpoint.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde_json::json;

use crate::adapters::http::app_state::AppState;
use crate::app_error::{AppError, AppResult};
use crate::infra::signature::SIGNATURE_HEADER;

/// POST /api/webhooks/stripe
///
/// The body is taken as raw bytes so the signature is checked against exactly
/// what the provider sent.
async fn receive_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|v| {
            v.to_str().map_err(|_| {
                AppError::MalformedRequest("Stripe signature header is not valid ASCII".into())
            })
        })
        .transpose()?;

    let now = chrono::Utc::now().timestamp();

    app_state
        .webhook_use_cases
        .receive(&body, signature, now)
        .await?;

    Ok(Json(json!({ "received": true })))
}

/// OPTIONS /api/webhooks/stripe
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(receive_webhook).options(preflight))
}
