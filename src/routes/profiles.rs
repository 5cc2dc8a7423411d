use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{auth::normalize_email, envelope, ApiJson};
use crate::{
    audit::{self, AuditEntry},
    auth::{password, AuthenticatedUser, Role},
    error::{AppError, AppResult},
    models::{AdminUser, NewAdminUser},
    schema::admin_users::dsl,
    state::AppState,
};

#[derive(Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl From<AdminUser> for Profile {
    fn from(user: AdminUser) -> Self {
        Self {
            id: user.id,
            user_id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct GrantRequest {
    pub email: String,
    pub role: Option<Role>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct GrantResponse {
    pub profile: Profile,
    pub message: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub role: Role,
}

#[derive(Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub deleted: usize,
}

pub async fn list_profiles(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiJson<Vec<Profile>>> {
    user.require(Role::Admin)?;
    let mut conn = state.db()?;
    let users = dsl::admin_users
        .order(dsl::created_at.asc())
        .load::<AdminUser>(&mut conn)?;
    Ok(envelope(users.into_iter().map(Profile::from).collect()))
}

/// Grants `role` to the account with this email, creating the account when
/// it does not exist yet.
pub async fn grant_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<GrantRequest>,
) -> AppResult<ApiJson<GrantResponse>> {
    user.require(Role::Admin)?;

    let email = normalize_email(&payload.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::bad_request("a valid email is required"));
    }

    let mut conn = state.db()?;
    let existing: Option<AdminUser> = dsl::admin_users
        .filter(dsl::email.eq(&email))
        .first(&mut conn)
        .optional()?;

    if let Some(existing) = existing {
        let role = payload
            .role
            .map(Role::as_str)
            .unwrap_or(existing.role.as_str())
            .to_string();
        let previous_role = existing.role.clone();
        let updated: AdminUser = diesel::update(dsl::admin_users.find(existing.id))
            .set((
                dsl::role.eq(&role),
                dsl::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result(&mut conn)?;

        audit::record(
            &mut conn,
            &user,
            AuditEntry {
                action: audit::ROLE_GRANTED,
                target_id: Some(updated.id),
                target_email: Some(&updated.email),
                details: Some(json!({ "previous_role": previous_role, "role": updated.role })),
            },
        );
        tracing::info!(email = %updated.email, role = %updated.role, "role granted");

        return Ok(envelope(GrantResponse {
            profile: Profile::from(updated),
            message: "User role updated".to_string(),
        }));
    }

    let password = payload
        .password
        .ok_or_else(|| AppError::bad_request("password is required for a new user"))?;
    if let Some(reason) = password::validate_new_password(&password) {
        return Err(AppError::bad_request(reason));
    }
    let role = payload.role.unwrap_or(Role::Viewer);

    let new_user = NewAdminUser {
        id: Uuid::new_v4(),
        email,
        password_hash: password::hash_password(&password)?,
        role: role.as_str().to_string(),
    };
    let saved: AdminUser = diesel::insert_into(dsl::admin_users)
        .values(&new_user)
        .get_result(&mut conn)?;

    audit::record(
        &mut conn,
        &user,
        AuditEntry {
            action: audit::USER_CREATED,
            target_id: Some(saved.id),
            target_email: Some(&saved.email),
            details: Some(json!({ "role": saved.role })),
        },
    );
    tracing::info!(email = %saved.email, role = %saved.role, "user created");

    Ok(envelope(GrantResponse {
        profile: Profile::from(saved),
        message: "New user created".to_string(),
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<ApiJson<Profile>> {
    user.require(Role::Admin)?;

    let mut conn = state.db()?;
    let existing: AdminUser = dsl::admin_users.find(profile_id).first(&mut conn)?;
    let updated: AdminUser = diesel::update(dsl::admin_users.find(profile_id))
        .set((
            dsl::role.eq(payload.role.as_str()),
            dsl::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result(&mut conn)?;

    audit::record(
        &mut conn,
        &user,
        AuditEntry {
            action: audit::ROLE_CHANGED,
            target_id: Some(updated.id),
            target_email: Some(&updated.email),
            details: Some(json!({ "previous_role": existing.role, "role": updated.role })),
        },
    );

    Ok(envelope(Profile::from(updated)))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
) -> AppResult<ApiJson<DeleteResponse>> {
    user.require(Role::Admin)?;
    if profile_id == user.user_id {
        return Err(AppError::bad_request("you cannot delete your own account"));
    }

    let mut conn = state.db()?;
    let target: AdminUser = dsl::admin_users.find(profile_id).first(&mut conn)?;
    diesel::delete(dsl::admin_users.find(profile_id)).execute(&mut conn)?;

    audit::record(
        &mut conn,
        &user,
        AuditEntry {
            action: audit::USER_DELETED,
            target_id: Some(target.id),
            target_email: Some(&target.email),
            details: Some(json!({ "role": target.role })),
        },
    );
    tracing::info!(email = %target.email, "user deleted");

    Ok(envelope(DeleteResponse {
        message: "User deleted".to_string(),
        deleted: 1,
    }))
}

pub async fn bulk_delete_profiles(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<BulkDeleteRequest>,
) -> AppResult<ApiJson<DeleteResponse>> {
    user.require(Role::Admin)?;
    if payload.ids.is_empty() {
        return Err(AppError::bad_request("Invalid IDs provided"));
    }
    if payload.ids.contains(&user.user_id) {
        return Err(AppError::bad_request("you cannot delete your own account"));
    }

    let mut conn = state.db()?;
    let (deleted, emails) = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let emails: Vec<String> = dsl::admin_users
            .filter(dsl::id.eq_any(payload.ids.clone()))
            .select(dsl::email)
            .load(conn)?;
        let deleted = diesel::delete(dsl::admin_users.filter(dsl::id.eq_any(payload.ids.clone())))
            .execute(conn)?;
        Ok((deleted, emails))
    })?;

    audit::record(
        &mut conn,
        &user,
        AuditEntry {
            action: audit::USERS_BULK_DELETED,
            target_id: None,
            target_email: None,
            details: Some(json!({ "ids": payload.ids, "emails": emails, "count": deleted })),
        },
    );
    tracing::info!(count = deleted, "users deleted");

    Ok(envelope(DeleteResponse {
        message: "Users deleted".to_string(),
        deleted,
    }))
}
