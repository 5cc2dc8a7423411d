//! Audit trail for admin actions on console accounts.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    models::NewAuditLog,
    schema::admin_audit_logs,
};

pub const ROLE_GRANTED: &str = "role_granted";
pub const ROLE_CHANGED: &str = "role_changed";
pub const USER_CREATED: &str = "user_created";
pub const USER_DELETED: &str = "user_deleted";
pub const USERS_BULK_DELETED: &str = "users_bulk_deleted";

pub const TARGET_USER: &str = "admin_user";

/// What happened to which account.
pub struct AuditEntry<'a> {
    pub action: &'a str,
    pub target_id: Option<Uuid>,
    pub target_email: Option<&'a str>,
    pub details: Option<Value>,
}

/// Writes one audit row. A failed write is logged and otherwise ignored so
/// the action being audited still succeeds.
pub fn record(conn: &mut PgConnection, actor: &AuthenticatedUser, entry: AuditEntry<'_>) {
    let row = NewAuditLog {
        id: Uuid::new_v4(),
        action: entry.action.to_string(),
        target_type: TARGET_USER.to_string(),
        target_id: entry.target_id.map(|id| id.to_string()),
        target_email: entry.target_email.map(str::to_string),
        details: entry.details,
        performed_by: actor.user_id,
        performed_by_email: Some(actor.email.clone()),
    };

    if let Err(err) = diesel::insert_into(admin_audit_logs::table)
        .values(&row)
        .execute(conn)
    {
        tracing::warn!(action = %row.action, error = %err, "failed to write audit log");
    }
}
