use axum::extract::State;
use diesel::prelude::*;

use super::{envelope, ApiJson};
use crate::{
    auth::{AuthenticatedUser, Role},
    error::AppResult,
    models::AuditLog,
    schema::admin_audit_logs,
    state::AppState,
};

const AUDIT_PAGE_SIZE: i64 = 100;

pub async fn list_audit_logs(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiJson<Vec<AuditLog>>> {
    user.require(Role::Admin)?;
    let mut conn = state.db()?;
    let entries = admin_audit_logs::table
        .order(admin_audit_logs::created_at.desc())
        .limit(AUDIT_PAGE_SIZE)
        .load::<AuditLog>(&mut conn)?;
    Ok(envelope(entries))
}
