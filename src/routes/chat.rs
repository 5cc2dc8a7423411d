use axum::{extract::State, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{envelope, inquiries::insert_inquiry, ApiJson};
use crate::{
    chat::{respond, ChatMessage, Intent},
    error::{AppError, AppResult},
    models::{Appointment, NewInquiry, Property},
    schema::{appointments, properties},
    state::AppState,
};

pub const SCHEDULE_VIEWING: &str = "schedule_viewing";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, alias = "viewing_data")]
    pub viewing_data: Option<ViewingRequest>,
}

/// A viewing booked from the property detail dialog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewingRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(alias = "property_title")]
    pub property_title: String,
}

impl ViewingRequest {
    fn to_new_inquiry(&self) -> AppResult<NewInquiry> {
        if self.name.trim().is_empty() || self.phone.trim().is_empty() {
            return Err(AppError::bad_request("name and phone are required"));
        }
        Ok(NewInquiry {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            message: Some(format!("Property Viewing Request: {}", self.property_title)),
            budget: None,
            preferred_area: self.location.clone(),
            preferred_time: Some(self.time.clone()),
            appointment_date: Some(self.date.clone()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Appointment>,
    pub scheduled: bool,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> AppResult<ApiJson<ChatResponse>> {
    if request.action.as_deref() == Some(SCHEDULE_VIEWING) {
        let viewing = request
            .viewing_data
            .ok_or_else(|| AppError::bad_request("viewingData is required"))?;
        return schedule_viewing(&state, viewing);
    }

    let history = request
        .messages
        .filter(|messages| !messages.is_empty())
        .ok_or_else(|| AppError::bad_request("Messages array required"))?;

    let mut conn = state.db()?;
    let listings: Vec<Property> = properties::table
        .order(properties::created_at.desc())
        .load(&mut conn)?;

    let reply = respond(&history, &listings);
    tracing::debug!(intent = ?reply.intent, "chat reply selected");

    let appointment = match reply.booking.as_ref() {
        Some(booking) => {
            let saved: Appointment = diesel::insert_into(appointments::table)
                .values(&booking.to_new_appointment())
                .get_result(&mut conn)?;
            tracing::info!(
                appointment_id = %saved.id,
                property = booking.property_label(),
                "visit booked from chat"
            );
            Some(saved)
        }
        None => None,
    };

    Ok(envelope(ChatResponse {
        scheduled: appointment.is_some(),
        message: reply.message,
        intent: Some(reply.intent),
        suggestions: reply.suggestions,
        appointment,
    }))
}

fn schedule_viewing(state: &AppState, viewing: ViewingRequest) -> AppResult<ApiJson<ChatResponse>> {
    let inquiry = viewing.to_new_inquiry()?;
    let mut conn = state.db()?;
    insert_inquiry(&mut conn, &inquiry)?;

    Ok(envelope(ChatResponse {
        message: format!(
            "Great! Your viewing for {} has been scheduled for {} at {}. Our team will contact you at {} to confirm.",
            viewing.property_title, viewing.date, viewing.time, viewing.phone
        ),
        intent: None,
        suggestions: Vec::new(),
        appointment: None,
        scheduled: true,
    }))
}
