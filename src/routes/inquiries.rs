use axum::{extract::State, Json};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use super::{envelope, ApiJson};
use crate::{
    auth::{AuthenticatedUser, Role},
    error::{AppError, AppResult},
    models::{Inquiry, NewInquiry},
    schema::customer_inquiries,
    state::AppState,
};

/// Contact-form submission from the public site.
#[derive(Debug, Deserialize)]
pub struct InquiryRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub budget: Option<String>,
    pub preferred_area: Option<String>,
    pub preferred_time: Option<String>,
    pub appointment_date: Option<String>,
}

impl InquiryRequest {
    pub fn into_new_inquiry(self) -> AppResult<NewInquiry> {
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        if name.is_empty() || email.is_empty() || phone.is_empty() {
            return Err(AppError::bad_request("name, email and phone are required"));
        }

        Ok(NewInquiry {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            message: self.message,
            budget: self.budget,
            preferred_area: self.preferred_area,
            preferred_time: self.preferred_time,
            appointment_date: self.appointment_date,
        })
    }
}

pub fn insert_inquiry(conn: &mut PgConnection, inquiry: &NewInquiry) -> AppResult<Inquiry> {
    let saved: Inquiry = diesel::insert_into(customer_inquiries::table)
        .values(inquiry)
        .get_result(conn)?;
    tracing::info!(inquiry_id = %saved.id, "inquiry received");
    Ok(saved)
}

pub async fn create_inquiry(
    State(state): State<AppState>,
    Json(payload): Json<InquiryRequest>,
) -> AppResult<ApiJson<Inquiry>> {
    let new_inquiry = payload.into_new_inquiry()?;
    let mut conn = state.db()?;
    Ok(envelope(insert_inquiry(&mut conn, &new_inquiry)?))
}

pub async fn list_inquiries(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiJson<Vec<Inquiry>>> {
    user.require(Role::Viewer)?;
    let mut conn = state.db()?;
    let inquiries = customer_inquiries::table
        .order(customer_inquiries::created_at.desc())
        .load::<Inquiry>(&mut conn)?;
    Ok(envelope(inquiries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_contact_details_are_rejected() {
        let request = InquiryRequest {
            name: "Asha".to_string(),
            email: "  ".to_string(),
            phone: "9876543210".to_string(),
            message: None,
            budget: None,
            preferred_area: None,
            preferred_time: None,
            appointment_date: None,
        };
        let err = request.into_new_inquiry().unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
