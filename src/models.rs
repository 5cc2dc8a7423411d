use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = properties)]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub price: String,
    pub sqft: Option<String>,
    pub beds: Option<i32>,
    pub baths: Option<i32>,
    pub description: Option<String>,
    pub primary_image_url: Option<String>,
    pub virtual_tour_url: Option<String>,
    pub featured: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = properties)]
pub struct NewProperty {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub price: String,
    pub sqft: Option<String>,
    pub beds: Option<i32>,
    pub baths: Option<i32>,
    pub description: Option<String>,
    pub primary_image_url: Option<String>,
    pub virtual_tour_url: Option<String>,
    pub featured: bool,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = property_images)]
#[diesel(belongs_to(Property))]
pub struct PropertyImage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub image_url: String,
    pub is_primary: bool,
    pub display_order: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = property_images)]
pub struct NewPropertyImage {
    pub id: Uuid,
    pub property_id: Uuid,
    pub image_url: String,
    pub is_primary: bool,
    pub display_order: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = customer_inquiries)]
pub struct Inquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub budget: Option<String>,
    pub preferred_area: Option<String>,
    pub preferred_time: Option<String>,
    pub appointment_date: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = customer_inquiries)]
pub struct NewInquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub budget: Option<String>,
    pub preferred_area: Option<String>,
    pub preferred_time: Option<String>,
    pub appointment_date: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = appointments)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub property_location: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub property_location: Option<String>,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = call_logs)]
pub struct CallLog {
    pub id: Uuid,
    pub call_id: String,
    pub agent_id: String,
    pub provider: String,
    pub customer_name: Option<String>,
    pub phone_number: String,
    pub status: String,
    pub duration: i32,
    pub recording_url: Option<String>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,
    pub language: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = call_logs)]
pub struct NewCallLog {
    pub id: Uuid,
    pub call_id: String,
    pub agent_id: String,
    pub provider: String,
    pub customer_name: Option<String>,
    pub phone_number: String,
    pub status: String,
    pub language: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = admin_users)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admin_users)]
pub struct NewAdminUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = admin_audit_logs)]
pub struct AuditLog {
    pub id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<String>,
    pub target_email: Option<String>,
    pub details: Option<serde_json::Value>,
    pub performed_by: Uuid,
    pub performed_by_email: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admin_audit_logs)]
pub struct NewAuditLog {
    pub id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<String>,
    pub target_email: Option<String>,
    pub details: Option<serde_json::Value>,
    pub performed_by: Uuid,
    pub performed_by_email: Option<String>,
}

/// Appointment lifecycle labels. Any label may follow any other; only the
/// vocabulary is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

/// Outcome labels reported by the call providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    Queued,
    Completed,
    NoAnswer,
    Failed,
    Busy,
}

impl CallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CallStatus::Queued => "queued",
            CallStatus::Completed => "completed",
            CallStatus::NoAnswer => "no-answer",
            CallStatus::Failed => "failed",
            CallStatus::Busy => "busy",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "queued" => Ok(CallStatus::Queued),
            "completed" => Ok(CallStatus::Completed),
            "no-answer" | "no_answer" => Ok(CallStatus::NoAnswer),
            "failed" => Ok(CallStatus::Failed),
            "busy" => Ok(CallStatus::Busy),
            other => Err(format!("unknown call status: {other}")),
        }
    }
}
