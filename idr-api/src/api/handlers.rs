//! HTTP request handlers

use axum::{extract::State, Json};
use idr_common::api::types::{IdentifyRequest, IdentifyResponse};
use serde::Serialize;
use tracing::info;

use crate::api::{ApiError, ApiResult};
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
///
/// Health check endpoint for monitoring. Touches no state.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "idr-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /identify
///
/// Resolves the submitted (email, phoneNumber) fact into its canonical
/// identity cluster and returns the cluster view. At least one channel
/// must be present.
pub async fn identify(
    State(state): State<AppState>,
    Json(req): Json<IdentifyRequest>,
) -> ApiResult<Json<IdentifyResponse>> {
    if req.email.is_none() && req.phone_number.is_none() {
        return Err(ApiError::BadRequest(
            "at least one of email and phoneNumber is required".to_string(),
        ));
    }

    let contact = state
        .resolver
        .resolve(req.email.as_deref(), req.phone_number.as_deref())
        .await?;

    info!(
        primary = contact.primary_contact_id,
        secondaries = contact.secondary_contact_ids.len(),
        "identify resolved"
    );

    Ok(Json(IdentifyResponse { contact }))
}
