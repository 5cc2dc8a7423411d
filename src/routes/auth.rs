use axum::{extract::State, Json};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{envelope, ApiJson};
use crate::{
    auth::{password, AuthenticatedUser, Role},
    error::{AppError, AppResult},
    models::{AdminUser, NewAdminUser},
    schema::admin_users::dsl,
    state::AppState,
};

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(alias = "currentPassword")]
    pub current_password: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

#[derive(Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl From<&AdminUser> for UserSummary {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserSummary,
    pub session: Option<Session>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> AppResult<ApiJson<AuthResponse>> {
    let email = normalize_email(&payload.email);
    let mut conn = state.db()?;

    let user: Option<AdminUser> = dsl::admin_users
        .filter(dsl::email.eq(&email))
        .first(&mut conn)
        .optional()?;

    // Unknown accounts and wrong passwords are indistinguishable to the caller.
    let Some(user) = user else {
        tracing::info!(%email, "login for unknown account");
        return Err(AppError::invalid_credentials());
    };

    let valid = password::verify_password(&payload.password, &user.password_hash)
        .map_err(|_| AppError::invalid_credentials())?;
    if !valid {
        tracing::info!(%email, "login with wrong password");
        return Err(AppError::invalid_credentials());
    }

    let access_token = state.jwt.generate_token(user.id, &user.email, &user.role)?;

    Ok(envelope(AuthResponse {
        user: UserSummary::from(&user),
        session: Some(Session {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: state.jwt.expires_in_seconds(),
        }),
    }))
}

/// Self-service registration. New accounts always start as viewers.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> AppResult<ApiJson<AuthResponse>> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::bad_request("a valid email is required"));
    }
    if let Some(reason) = password::validate_new_password(&payload.password) {
        return Err(AppError::bad_request(reason));
    }

    let new_user = NewAdminUser {
        id: Uuid::new_v4(),
        email,
        password_hash: password::hash_password(&payload.password)?,
        role: Role::Viewer.as_str().to_string(),
    };

    let mut conn = state.db()?;
    let saved: AdminUser = match diesel::insert_into(dsl::admin_users)
        .values(&new_user)
        .get_result(&mut conn)
    {
        Ok(user) => user,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => return Err(AppError::conflict("an account with this email already exists")),
        Err(err) => return Err(AppError::from(err)),
    };

    tracing::info!(email = %saved.email, "account registered");

    Ok(envelope(AuthResponse {
        user: UserSummary::from(&saved),
        session: None,
    }))
}

pub async fn me(user: AuthenticatedUser) -> ApiJson<AuthenticatedUser> {
    envelope(user)
}

pub async fn update_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<ApiJson<MessageResponse>> {
    if let Some(reason) = password::validate_new_password(&payload.new_password) {
        return Err(AppError::bad_request(reason));
    }

    let mut conn = state.db()?;
    let account: AdminUser = dsl::admin_users.find(user.user_id).first(&mut conn)?;

    if !password::verify_password(&payload.current_password, &account.password_hash)? {
        return Err(AppError::bad_request("Incorrect current password"));
    }

    let password_hash = password::hash_password(&payload.new_password)?;
    diesel::update(dsl::admin_users.find(account.id))
        .set((
            dsl::password_hash.eq(password_hash),
            dsl::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

    tracing::info!(email = %account.email, "password updated");

    Ok(envelope(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}
