use axum::{extract::State, http::StatusCode, response::{IntoResponse, Json}};
use tracing::info;

use super::mappers::field_mapper::FieldMapper;
use crate::backend::AppState;
use shared::FieldListResponse;

/// List registered donation fields in registration order
pub async fn list_fields(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/fields");

    let fields = state.fields.all().map(FieldMapper::to_summary).collect();
    (StatusCode::OK, Json(FieldListResponse { fields }))
}
