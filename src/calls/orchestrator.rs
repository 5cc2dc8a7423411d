use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{phone::normalize_phone, prompt::property_context, OutboundCall};
use crate::{
    error::{AppError, AppResult},
    models::{CallLog, CallStatus, NewCallLog, Property},
    schema::{call_logs, properties},
    state::AppState,
};

pub const CALL_LANGUAGE: &str = "english";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(default, alias = "inquiry_id")]
    pub inquiry_id: Option<Uuid>,
    #[serde(default, alias = "phone_number", alias = "phone")]
    pub phone_number: Option<String>,
    #[serde(default, alias = "customer_name", alias = "name")]
    pub customer_name: Option<String>,
    #[serde(default, alias = "preferred_area")]
    pub preferred_area: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitiatedCall {
    pub call_id: String,
    pub status: String,
    pub provider: String,
    pub phone_number: String,
    pub message: String,
    /// Absent when the call went out but its log row could not be written.
    pub log_id: Option<Uuid>,
}

/// Places an outbound call to a lead through the configured provider and
/// records it as a queued call log.
pub async fn initiate_call(state: &AppState, request: CallRequest) -> AppResult<InitiatedCall> {
    let raw_phone = request
        .phone_number
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Phone number is required"))?;
    let phone = normalize_phone(raw_phone, &state.config.calls.default_country_code)
        .map_err(|err| AppError::bad_request(err.to_string()))?;

    let preferred_area = non_blank(request.preferred_area);
    let context = {
        let mut conn = state.db()?;
        let listings: Vec<Property> = properties::table
            .order(properties::created_at.desc())
            .load(&mut conn)?;
        property_context(&listings, preferred_area.as_deref())
    };

    let call = OutboundCall {
        inquiry_id: request.inquiry_id,
        phone,
        customer_name: non_blank(request.customer_name),
        preferred_area,
        budget: non_blank(request.budget),
        property_context: context,
    };

    let provider = state.caller.name();
    tracing::info!(phone = %call.phone, provider, "initiating outbound call");

    let placed = match state.caller.place_call(&call).await {
        Ok(placed) => placed,
        Err(err) => {
            tracing::error!(phone = %call.phone, provider, error = %err, "outbound call failed");
            return Err(err.into());
        }
    };

    tracing::info!(call_id = %placed.call_id, provider, "outbound call queued");

    let log = NewCallLog {
        id: Uuid::new_v4(),
        call_id: placed.call_id.clone(),
        agent_id: placed.agent_id.clone(),
        provider: provider.to_string(),
        customer_name: call.customer_name.clone(),
        phone_number: call.phone.clone(),
        status: CallStatus::Queued.as_str().to_string(),
        language: CALL_LANGUAGE.to_string(),
    };
    let log_id = match record_call(state, &log) {
        Ok(saved) => Some(saved.id),
        Err(err) => {
            tracing::warn!(call_id = %placed.call_id, error = %err.message(), "failed to record call log");
            None
        }
    };

    Ok(InitiatedCall {
        call_id: placed.call_id,
        status: CallStatus::Queued.as_str().to_string(),
        provider: provider.to_string(),
        phone_number: call.phone,
        message: "Call initiated successfully".to_string(),
        log_id,
    })
}

fn record_call(state: &AppState, log: &NewCallLog) -> AppResult<CallLog> {
    let mut conn = state.db()?;
    let saved = diesel::insert_into(call_logs::table)
        .values(log)
        .get_result(&mut conn)?;
    Ok(saved)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_camel_and_snake_case_fields() {
        let camel: CallRequest = serde_json::from_value(json!({
            "phoneNumber": "9876543210",
            "customerName": "Asha",
            "preferredArea": "Bandra",
        }))
        .unwrap();
        assert_eq!(camel.phone_number.as_deref(), Some("9876543210"));
        assert_eq!(camel.preferred_area.as_deref(), Some("Bandra"));

        let snake: CallRequest = serde_json::from_value(json!({
            "phone_number": "9876543210",
            "customer_name": "Asha",
            "budget": "3 Cr",
        }))
        .unwrap();
        assert_eq!(snake.customer_name.as_deref(), Some("Asha"));
        assert_eq!(snake.budget.as_deref(), Some("3 Cr"));
    }

    #[test]
    fn blank_optional_fields_are_dropped() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" Pune ".to_string())), Some("Pune".to_string()));
    }
}
