use axum::http::HeaderValue;
use axum::{
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{auth::AuthenticatedUser, state::AppState};

pub mod appointments;
pub mod audit_logs;
pub mod auth;
pub mod call_logs;
pub mod calls;
pub mod chat;
pub mod health;
pub mod inquiries;
pub mod profiles;
pub mod properties;
pub mod property_images;

/// Every response body is `{ "data": ..., "error": ... }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub error: Option<String>,
}

pub type ApiJson<T> = Json<Envelope<T>>;

pub fn envelope<T: Serialize>(data: T) -> ApiJson<T> {
    Json(Envelope { data, error: None })
}

pub fn create_router(state: AppState) -> Router<()> {
    let cors = match state.config.cors_allowed_origin.as_ref() {
        Some(origins) => {
            let headers: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .filter_map(|value| match value.parse::<HeaderValue>() {
                    Ok(header) => Some(header),
                    Err(_) => {
                        tracing::warn!(origin = value, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new().allow_origin(AllowOrigin::list(headers))
        }
        None => CorsLayer::new().allow_origin(AllowOrigin::mirror_request()),
    }
    .allow_methods(AllowMethods::mirror_request())
    .allow_headers(AllowHeaders::mirror_request())
    .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/me", get(auth::me))
        .route("/update-password", post(auth::update_password));

    // Reads are public, writes check the caller's role in the handler.
    let property_routes = Router::new()
        .route(
            "/",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/:id",
            get(properties::get_property)
                .patch(properties::update_property)
                .delete(properties::delete_property),
        );

    let image_routes = Router::new()
        .route(
            "/",
            get(property_images::list_images).post(property_images::create_image),
        )
        .route(
            "/:id",
            patch(property_images::update_image).delete(property_images::delete_image),
        );

    let inquiry_routes = Router::new().route(
        "/",
        get(inquiries::list_inquiries).post(inquiries::create_inquiry),
    );

    let appointment_routes = Router::new()
        .route(
            "/",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/:id",
            patch(appointments::update_appointment).delete(appointments::delete_appointment),
        );

    let call_log_routes = Router::new()
        .route("/", get(call_logs::list_call_logs))
        .route(
            "/:id",
            get(call_logs::get_call_log).patch(call_logs::update_call_log),
        )
        .route("/:id/sync", post(call_logs::sync_call_log));

    let profile_routes = Router::new()
        .route(
            "/",
            get(profiles::list_profiles).post(profiles::grant_profile),
        )
        .route("/bulk-delete", post(profiles::bulk_delete_profiles))
        .route(
            "/:id",
            patch(profiles::update_profile).delete(profiles::delete_profile),
        );

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .nest("/api/call_appointments", appointment_routes)
        .nest("/api/call_logs", call_log_routes)
        .nest("/api/profiles", profile_routes)
        .route("/api/calls", post(calls::initiate))
        .route("/api/audit_logs", get(audit_logs::list_audit_logs))
        .layer(middleware::from_extractor_with_state::<AuthenticatedUser, _>(protected_state));

    Router::new()
        .merge(protected_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/properties", property_routes)
        .nest("/api/property_images", image_routes)
        .nest("/api/customer_inquiries", inquiry_routes)
        .route("/api/chat", post(chat::chat))
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
