//! # REST API for Donors
//!
//! Endpoints for registering donors, fetching them and looking up IDs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use super::mappers::donor_mapper::DonorMapper;
use crate::backend::domain::DonorError;
use crate::backend::AppState;
use shared::{
    CreateDonorRequest, DonorCountQuery, DonorCountResponse, DonorIdResponse, DonorLookupQuery,
    UserIdResponse,
};

/// Register a new donor
pub async fn create_donor(
    State(state): State<AppState>,
    Json(request): Json<CreateDonorRequest>,
) -> impl IntoResponse {
    info!("POST /api/donors - email: {}", request.email);

    let command = DonorMapper::to_register_command(request);
    match state.donor_service.register_donor(command).await {
        Ok(donor_id) => (StatusCode::CREATED, Json(DonorMapper::to_create_response(donor_id))).into_response(),
        Err(e) => match e.downcast_ref::<DonorError>() {
            Some(DonorError::Invalid(message)) => {
                info!("Rejected donor registration: {}", message);
                (StatusCode::BAD_REQUEST, message.clone()).into_response()
            }
            None => {
                error!("Failed to register donor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error registering donor").into_response()
            }
        },
    }
}

/// Get a donor by ID
pub async fn get_donor(
    State(state): State<AppState>,
    Path(donor_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/donors/{}", donor_id);

    match state.donor_service.get_donor(donor_id).await {
        Ok(Some(donor)) => (StatusCode::OK, Json(DonorMapper::to_dto(donor))).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Donor not found").into_response(),
        Err(e) => {
            error!("Failed to get donor: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving donor").into_response()
        }
    }
}

/// Find the donor ID registered for an email address
pub async fn lookup_donor(
    State(state): State<AppState>,
    Query(query): Query<DonorLookupQuery>,
) -> impl IntoResponse {
    info!("GET /api/donors/lookup - email: {}", query.email);

    match state.donor_service.find_donor_id_by_email(&query.email).await {
        Ok(Some(donor_id)) => (StatusCode::OK, Json(DonorIdResponse { donor_id })).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Donor not found").into_response(),
        Err(e) => {
            error!("Failed to look up donor: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error looking up donor").into_response()
        }
    }
}

/// Count donors with donations in the given comma separated statuses
pub async fn count_donors(
    State(state): State<AppState>,
    Query(query): Query<DonorCountQuery>,
) -> impl IntoResponse {
    info!("GET /api/donors/count - query: {:?}", query);

    let statuses = query.status.map(|status| {
        status
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect::<Vec<_>>()
    });

    match state.donor_service.count_donors_with_donations(statuses).await {
        Ok(count) => (StatusCode::OK, Json(DonorCountResponse { count })).into_response(),
        Err(e) => {
            error!("Failed to count donors: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error counting donors").into_response()
        }
    }
}

/// Find the donor linked to a user account
pub async fn get_donor_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/users/{}/donor", user_id);

    match state.donor_service.find_donor_id_by_user(user_id).await {
        Ok(Some(donor_id)) => (StatusCode::OK, Json(DonorIdResponse { donor_id })).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Donor not found").into_response(),
        Err(e) => {
            error!("Failed to look up donor by user: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error looking up donor").into_response()
        }
    }
}

/// Find the user account linked to a donor
pub async fn get_donor_user(
    State(state): State<AppState>,
    Path(donor_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/donors/{}/user", donor_id);

    match state.donor_service.find_user_id(donor_id).await {
        Ok(Some(user_id)) => (StatusCode::OK, Json(UserIdResponse { user_id })).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Donor not found").into_response(),
        Err(e) => {
            error!("Failed to look up donor user: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error looking up user").into_response()
        }
    }
}
