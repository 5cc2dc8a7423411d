use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::{envelope, ApiJson};
use crate::{
    auth::{AuthenticatedUser, Role},
    error::{AppError, AppResult},
    models::{CallLog, CallStatus},
    schema::call_logs,
    state::AppState,
    utils::json::{classify_nullable, classify_required},
};

#[derive(AsChangeset)]
#[diesel(table_name = call_logs)]
struct UpdateCallLogChangeset {
    status: Option<String>,
    duration: Option<i32>,
    recording_url: Option<Option<String>>,
    transcript: Option<Option<String>>,
    summary: Option<Option<String>>,
    ended_at: Option<Option<chrono::NaiveDateTime>>,
}

impl UpdateCallLogChangeset {
    fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.duration.is_none()
            && self.recording_url.is_none()
            && self.transcript.is_none()
            && self.summary.is_none()
            && self.ended_at.is_none()
    }
}

pub async fn list_call_logs(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiJson<Vec<CallLog>>> {
    user.require(Role::Viewer)?;
    let mut conn = state.db()?;
    let logs = call_logs::table
        .order(call_logs::started_at.desc())
        .load::<CallLog>(&mut conn)?;
    Ok(envelope(logs))
}

pub async fn get_call_log(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(log_id): Path<Uuid>,
) -> AppResult<ApiJson<CallLog>> {
    user.require(Role::Viewer)?;
    let mut conn = state.db()?;
    let log: CallLog = call_logs::table.find(log_id).first(&mut conn)?;
    Ok(envelope(log))
}

/// Records a call outcome reported out of band. Status labels are checked,
/// transitions are not.
pub async fn update_call_log(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(log_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> AppResult<ApiJson<CallLog>> {
    user.require(Role::Editor)?;

    let status = classify_required::<String>(&body, "status")
        .map_err(AppError::bad_request)?
        .map(|raw| {
            raw.parse::<CallStatus>()
                .map(|status| status.as_str().to_string())
                .map_err(AppError::bad_request)
        })
        .transpose()?;

    let duration = classify_required::<i32>(&body, "duration").map_err(AppError::bad_request)?;
    if duration.is_some_and(|seconds| seconds < 0) {
        return Err(AppError::bad_request("duration must not be negative"));
    }

    let nullable_text = |field: &str| -> AppResult<Option<Option<String>>> {
        Ok(classify_nullable::<String>(&body, field)
            .map_err(AppError::bad_request)?
            .into_change())
    };

    let ended_at = classify_nullable::<DateTime<Utc>>(&body, "ended_at")
        .map_err(AppError::bad_request)?
        .into_change()
        .map(|value| value.map(|at| at.naive_utc()));

    let changeset = UpdateCallLogChangeset {
        status,
        duration,
        recording_url: nullable_text("recording_url")?,
        transcript: nullable_text("transcript")?,
        summary: nullable_text("summary")?,
        ended_at,
    };

    let mut conn = state.db()?;
    let log: CallLog = if changeset.is_empty() {
        call_logs::table.find(log_id).first(&mut conn)?
    } else {
        diesel::update(call_logs::table.find(log_id))
            .set(&changeset)
            .get_result(&mut conn)?
    };

    tracing::info!(call_id = %log.call_id, status = %log.status, "call log updated");
    Ok(envelope(log))
}

/// Providers report progress out of band, so syncing returns the stored log as is.
pub async fn sync_call_log(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(log_id): Path<Uuid>,
) -> AppResult<ApiJson<CallLog>> {
    user.require(Role::Viewer)?;
    let mut conn = state.db()?;
    let log: CallLog = call_logs::table.find(log_id).first(&mut conn)?;
    tracing::debug!(call_id = %log.call_id, "call log sync requested");
    Ok(envelope(log))
}
