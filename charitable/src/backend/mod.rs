//! # Backend Module
//!
//! Contains all non-UI logic for the donation backend.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Config**: YAML configuration and the option store
//! - **Domain**: donors, donation fields and addons
//! - **Storage**: SQLite persistence behind storage traits
//! - **IO**: the REST API and admin view partials
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, view partials)
//!     ↓
//! Domain Layer (services, field registry, addon dispatcher)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! Startup connects to the database, creates the tables, registers the core
//! donation fields and then lets the addon dispatcher react to the
//! activation and `plugins_loaded` events before the router is built.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::backend::config::{CharitableConfig, Settings};
use crate::backend::domain::addons::{AddonContext, AddonDispatcher, AddonRegistry, HostEvent};
use crate::backend::domain::fields::{register_core_fields, FieldRegistry};
use crate::backend::domain::DonorService;
use crate::backend::storage::{DbConnection, DonationRepository, DonationStorage, DonorRepository, DonorStorage};

/// Main application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub donor_service: DonorService,
    pub fields: Arc<FieldRegistry>,
    pub settings: Arc<Settings>,
}

/// Initialize the backend from configuration
pub async fn initialize_backend(
    config: &CharitableConfig,
    addons: AddonRegistry,
    activations: &[String],
) -> Result<AppState> {
    info!("Setting up database");
    let db = DbConnection::new(&config.database_url, &config.table_prefix).await?;
    build_state(db, config, addons, activations).await
}

/// Create the schema, register fields and run the addon startup events
pub async fn build_state(
    db: DbConnection,
    config: &CharitableConfig,
    addons: AddonRegistry,
    activations: &[String],
) -> Result<AppState> {
    let donors = DonorRepository::new(db.clone());
    donors.create_table().await?;
    DonationRepository::new(db).create_tables().await?;

    info!("Setting up donation fields");
    let mut fields = FieldRegistry::new();
    register_core_fields(&mut fields)?;

    info!("Dispatching addon events");
    let mut dispatcher = AddonDispatcher::new(addons, config.active_addons.clone());
    {
        let mut ctx = AddonContext {
            fields: &mut fields,
            settings: &config.settings,
        };
        for slug in activations {
            dispatcher.handle(&HostEvent::ActivateAddon { slug: slug.clone() }, &mut ctx);
        }
        dispatcher.handle(&HostEvent::PluginsLoaded, &mut ctx);
    }

    info!("Setting up application state");
    Ok(AppState {
        donor_service: DonorService::new(Arc::new(donors)),
        fields: Arc::new(fields),
        settings: Arc::new(config.settings.clone()),
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow the admin frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:8080"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/donors", post(io::create_donor))
        .route("/donors/lookup", get(io::lookup_donor))
        .route("/donors/count", get(io::count_donors))
        .route("/donors/:donor_id", get(io::get_donor))
        .route("/donors/:donor_id/user", get(io::get_donor_user))
        .route("/users/:user_id/donor", get(io::get_donor_by_user))
        .route("/privacy/export", post(io::export_personal_data))
        .route("/privacy/erase", post(io::erase_personal_data))
        .route("/fields", get(io::list_fields));

    let admin_routes = Router::new()
        .route("/fields", get(io::admin_fields_page))
        .route("/settings", get(io::admin_settings_page));

    Router::new()
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::addons::builtin_addons;
    use crate::backend::domain::models::{DonationStatus, NewDonation};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde::de::DeserializeOwned;
    use serde_json::json;
    use shared::{
        CreateDonorResponse, DonorCountResponse, DonorIdResponse, FieldListResponse,
        PersonalDataErasureResponse, PersonalDataExportResponse, UserIdResponse,
    };
    use tower::ServiceExt;

    async fn setup_test() -> (Router, DbConnection) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let config = CharitableConfig {
            active_addons: vec!["contact-consent".to_string()],
            ..CharitableConfig::default()
        };
        let state = build_state(db.clone(), &config, builtin_addons(), &[])
            .await
            .expect("Failed to build state");
        (create_router(state), db)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
        serde_json::from_slice(body).expect("Response was not valid JSON")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn create_donor(router: &Router, email: &str) -> i64 {
        let (status, body) = send(
            router,
            post_json("/api/donors", json!({ "email": email, "first_name": "Jane" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        parse::<CreateDonorResponse>(&body).donor_id
    }

    #[tokio::test]
    async fn test_create_and_lookup_donor() {
        let (router, _) = setup_test().await;
        let donor_id = create_donor(&router, "jane@example.com").await;

        let (status, body) = send(&router, get_request("/api/donors/lookup?email=jane@example.com")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<DonorIdResponse>(&body).donor_id, donor_id);

        let (status, body) = send(&router, get_request(&format!("/api/donors/{}", donor_id))).await;
        assert_eq!(status, StatusCode::OK);
        let donor: shared::Donor = parse(&body);
        assert_eq!(donor.first_name, "Jane");
        assert_eq!(donor.last_name, "");
        assert_eq!(donor.data_erased, None);
    }

    #[tokio::test]
    async fn test_unknown_donor_is_not_found() {
        let (router, _) = setup_test().await;

        let (status, _) = send(&router, get_request("/api/donors/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, get_request("/api/donors/lookup?email=nobody@example.com")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_donor_is_bad_request() {
        let (router, _) = setup_test().await;
        let (status, _) = send(&router, post_json("/api/donors", json!({ "email": "not-an-email" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal_error() {
        let (router, db) = setup_test().await;
        sqlx::query("DROP TABLE wp_charitable_donors")
            .execute(db.pool())
            .await
            .unwrap();

        let (status, body) = send(
            &router,
            post_json("/api/donors", json!({ "email": "jane@example.com", "first_name": "Jane" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(String::from_utf8(body).unwrap(), "Error registering donor");
    }

    #[tokio::test]
    async fn test_donor_user_links() {
        let (router, _) = setup_test().await;
        let (status, body) = send(
            &router,
            post_json("/api/donors", json!({ "email": "jane@example.com", "user_id": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let donor_id = parse::<CreateDonorResponse>(&body).donor_id;

        let (status, body) = send(&router, get_request("/api/users/42/donor")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<DonorIdResponse>(&body).donor_id, donor_id);

        let (status, body) = send(&router, get_request(&format!("/api/donors/{}/user", donor_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<UserIdResponse>(&body).user_id, 42);

        let (status, _) = send(&router, get_request("/api/users/7/donor")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&router, get_request("/api/donors/999/user")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_count_donors_by_status() {
        let (router, db) = setup_test().await;
        let completed = create_donor(&router, "a@example.com").await;
        let pending = create_donor(&router, "b@example.com").await;

        let donations = DonationRepository::new(db);
        for (donor_id, status) in [(completed, DonationStatus::Completed), (pending, DonationStatus::Pending)] {
            donations
                .record_donation(&NewDonation {
                    donor_id,
                    campaign_id: 1,
                    amount: 10.0,
                    status,
                })
                .await
                .unwrap();
        }

        let (_, body) = send(&router, get_request("/api/donors/count")).await;
        assert_eq!(parse::<DonorCountResponse>(&body).count, 1);

        let (_, body) = send(
            &router,
            get_request("/api/donors/count?status=charitable-completed,charitable-pending"),
        )
        .await;
        assert_eq!(parse::<DonorCountResponse>(&body).count, 2);

        // Nothing survives the whitelist, so every donor with a donation counts
        let (_, body) = send(&router, get_request("/api/donors/count?status=bogus")).await;
        assert_eq!(parse::<DonorCountResponse>(&body).count, 2);
    }

    #[tokio::test]
    async fn test_privacy_export_then_erase() {
        let (router, _) = setup_test().await;
        let donor_id = create_donor(&router, "jane@example.com").await;
        let request = json!({ "email": "jane@example.com" });

        let (status, body) = send(&router, post_json("/api/privacy/export", request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let export: PersonalDataExportResponse = parse(&body);
        assert_eq!(export.data.len(), 1);
        assert_eq!(export.data[0].item_id, format!("donor-{}", donor_id));

        let (_, body) = send(&router, post_json("/api/privacy/erase", request.clone())).await;
        let erasure: PersonalDataErasureResponse = parse(&body);
        assert!(erasure.items_removed);
        assert!(!erasure.items_retained);

        // The original email no longer matches anything
        let (_, body) = send(&router, post_json("/api/privacy/erase", request.clone())).await;
        let erasure: PersonalDataErasureResponse = parse(&body);
        assert!(!erasure.items_removed);
        assert_eq!(erasure.messages.len(), 1);

        let (_, body) = send(&router, post_json("/api/privacy/export", request)).await;
        assert!(parse::<PersonalDataExportResponse>(&body).data.is_empty());
    }

    #[tokio::test]
    async fn test_fields_include_loaded_addons() {
        let (router, _) = setup_test().await;

        let (status, body) = send(&router, get_request("/api/fields")).await;
        assert_eq!(status, StatusCode::OK);
        let keys: Vec<String> = parse::<FieldListResponse>(&body)
            .fields
            .into_iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(keys, vec!["first_name", "last_name", "email", "contact_consent"]);
    }

    #[tokio::test]
    async fn test_admin_fields_page_renders_text_inputs() {
        let (router, _) = setup_test().await;

        let (status, body) = send(&router, get_request("/admin/fields")).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();

        assert!(html.starts_with("<div class=\"charitable-description\">Donor details</div>"));
        assert!(html.contains("<div id=\"charitable-first_name-wrap\" class=\"charitable-metabox-wrap\">"));
        assert!(html.contains("<label for=\"charitable-field-first_name\">First name</label>"));
        assert!(html.contains("name=\"email\""));
        assert!(html.contains("tabindex=\"1\""));
        // The consent checkbox has no text input
        assert!(!html.contains("contact_consent"));
    }

    #[tokio::test]
    async fn test_admin_settings_page_reads_stored_options() {
        let db = DbConnection::init_test().await.unwrap();
        let mut values = serde_json::Map::new();
        values.insert("general".to_string(), json!({ "minimum_donation": 5 }));
        let config = CharitableConfig {
            settings: Settings::new(values),
            ..CharitableConfig::default()
        };
        let state = build_state(db, &config, builtin_addons(), &[]).await.unwrap();
        let router = create_router(state);

        let (status, body) = send(&router, get_request("/admin/settings")).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();

        assert!(html.contains(
            "<input type=\"number\" id=\"charitable_settings_general_minimum_donation\" \
             name=\"charitable_settings[minimum_donation]\" value=\"5\" min=\"0\" />"
        ));
        assert!(html.contains("id=\"charitable_settings_general_maximum_donation\""));
        assert!(html.contains("name=\"charitable_settings[maximum_donation]\" value=\"\""));
    }

    #[tokio::test]
    async fn test_unknown_active_addon_does_not_stop_startup() {
        let db = DbConnection::init_test().await.unwrap();
        let config = CharitableConfig {
            active_addons: vec!["missing-addon".to_string()],
            ..CharitableConfig::default()
        };
        let state = build_state(db, &config, builtin_addons(), &["missing-addon".to_string()])
            .await
            .expect("Unknown addons should be skipped");
        assert_eq!(state.fields.len(), 3);
    }
}
