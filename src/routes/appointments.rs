use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::{envelope, ApiJson};
use crate::{
    auth::{AuthenticatedUser, Role},
    error::{AppError, AppResult},
    models::{Appointment, AppointmentStatus, NewAppointment},
    schema::appointments,
    state::AppState,
    utils::json::{classify_nullable, classify_required},
};

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub property_location: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = appointments)]
struct UpdateAppointmentChangeset {
    customer_name: Option<String>,
    customer_phone: Option<String>,
    appointment_date: Option<Option<String>>,
    appointment_time: Option<Option<String>>,
    property_location: Option<Option<String>>,
    status: Option<String>,
    notes: Option<Option<String>>,
    updated_at: NaiveDateTime,
}

fn parse_status(raw: &str) -> AppResult<AppointmentStatus> {
    raw.parse().map_err(AppError::bad_request)
}

pub async fn list_appointments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiJson<Vec<Appointment>>> {
    user.require(Role::Viewer)?;
    let mut conn = state.db()?;
    let rows = appointments::table
        .order(appointments::created_at.desc())
        .load::<Appointment>(&mut conn)?;
    Ok(envelope(rows))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateAppointmentRequest>,
) -> AppResult<ApiJson<Appointment>> {
    user.require(Role::Editor)?;

    let customer_name = payload.customer_name.trim();
    let customer_phone = payload.customer_phone.trim();
    if customer_name.is_empty() || customer_phone.is_empty() {
        return Err(AppError::bad_request(
            "customer_name and customer_phone are required",
        ));
    }
    let status = match payload.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => AppointmentStatus::Pending,
    };

    let new_appointment = NewAppointment {
        id: Uuid::new_v4(),
        customer_name: customer_name.to_string(),
        customer_phone: customer_phone.to_string(),
        appointment_date: payload.appointment_date,
        appointment_time: payload.appointment_time,
        property_location: payload.property_location,
        status: status.as_str().to_string(),
        notes: payload.notes,
    };

    let mut conn = state.db()?;
    let saved: Appointment = diesel::insert_into(appointments::table)
        .values(&new_appointment)
        .get_result(&mut conn)?;
    Ok(envelope(saved))
}

/// Any status may replace any other.
pub async fn update_appointment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(appointment_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> AppResult<ApiJson<Appointment>> {
    user.require(Role::Editor)?;

    let required = |field: &str| -> AppResult<Option<String>> {
        classify_required::<String>(&body, field).map_err(AppError::bad_request)
    };
    let nullable = |field: &str| -> AppResult<Option<Option<String>>> {
        Ok(classify_nullable::<String>(&body, field)
            .map_err(AppError::bad_request)?
            .into_change())
    };

    let status = required("status")?
        .map(|raw| parse_status(&raw).map(|status| status.as_str().to_string()))
        .transpose()?;

    let changeset = UpdateAppointmentChangeset {
        customer_name: required("customer_name")?,
        customer_phone: required("customer_phone")?,
        appointment_date: nullable("appointment_date")?,
        appointment_time: nullable("appointment_time")?,
        property_location: nullable("property_location")?,
        status,
        notes: nullable("notes")?,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = state.db()?;
    let updated: Appointment = diesel::update(appointments::table.find(appointment_id))
        .set(&changeset)
        .get_result(&mut conn)?;

    tracing::info!(%appointment_id, status = %updated.status, "appointment updated");
    Ok(envelope(updated))
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(appointment_id): Path<Uuid>,
) -> AppResult<ApiJson<Value>> {
    user.require(Role::Editor)?;

    let mut conn = state.db()?;
    let deleted = diesel::delete(appointments::table.find(appointment_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(envelope(serde_json::json!({ "id": appointment_id })))
}
