//! # REST API for Privacy Requests
//!
//! Personal data export and erasure keyed by email address.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use super::mappers::donor_mapper::DonorMapper;
use crate::backend::AppState;
use shared::PersonalDataRequest;

pub async fn export_personal_data(
    State(state): State<AppState>,
    Json(request): Json<PersonalDataRequest>,
) -> impl IntoResponse {
    info!("POST /api/privacy/export - email: {}", request.email);

    match state.donor_service.export_personal_data(&request.email).await {
        Ok(export) => (StatusCode::OK, Json(DonorMapper::to_export_response(export))).into_response(),
        Err(e) => {
            error!("Failed to export personal data: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error exporting personal data").into_response()
        }
    }
}

pub async fn erase_personal_data(
    State(state): State<AppState>,
    Json(request): Json<PersonalDataRequest>,
) -> impl IntoResponse {
    info!("POST /api/privacy/erase - email: {}", request.email);

    match state.donor_service.erase_personal_data(&request.email).await {
        Ok(report) => (StatusCode::OK, Json(DonorMapper::to_erasure_response(report))).into_response(),
        Err(e) => {
            error!("Failed to erase personal data: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error erasing personal data").into_response()
        }
    }
}
