use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{call_id_from, endpoint, prompt, send_json, CallProvider, OutboundCall, PlacedCall, ProviderError};

const VOICE_ID: &str = "aUTn6mevnrM9pqtesisb";

/// VAPI phone calls. The assistant is overridden per call with a scripted
/// consultant prompt and a `schedule_appointment` tool.
pub struct VapiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    phone_number_id: String,
    assistant_id: String,
}

impl VapiProvider {
    pub fn new(
        client: Client,
        base_url: String,
        api_key: String,
        phone_number_id: String,
        assistant_id: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            phone_number_id,
            assistant_id,
        }
    }

    fn payload(&self, call: &OutboundCall) -> Value {
        let name = call.display_name();
        let system_prompt = prompt::consultant_prompt(
            name,
            call.preferred_area.as_deref(),
            call.budget.as_deref(),
            &call.property_context,
        );

        json!({
            "phoneNumberId": self.phone_number_id,
            "assistantId": self.assistant_id,
            "customer": {
                "number": call.phone,
                "name": name,
            },
            "assistantOverrides": {
                "firstMessage": prompt::verification_line(name),
                "model": {
                    "provider": "openai",
                    "model": "gpt-4o-mini",
                    "messages": [{ "role": "system", "content": system_prompt }],
                    "tools": [schedule_appointment_tool()],
                },
                "voice": {
                    "provider": "11labs",
                    "voiceId": VOICE_ID,
                    "model": "eleven_multilingual_v2",
                },
                "transcriber": {
                    "provider": "deepgram",
                    "model": "nova-2",
                    "language": "en",
                },
                "metadata": {
                    "inquiryId": call.inquiry_id,
                    "customerName": name,
                    "preferredArea": call.preferred_area.as_deref().unwrap_or("Not specified"),
                    "budget": call.budget.as_deref().unwrap_or("Not specified"),
                    "language": "english",
                },
            },
        })
    }
}

fn schedule_appointment_tool() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": "schedule_appointment",
            "description": "Schedule a property site visit appointment with the customer",
            "parameters": {
                "type": "object",
                "properties": {
                    "customerName": { "type": "string", "description": "Customer's name" },
                    "date": { "type": "string", "description": "Appointment date in YYYY-MM-DD format" },
                    "time": { "type": "string", "description": "Appointment time, e.g. 10:00 AM" },
                    "location": { "type": "string", "description": "Property location for the visit" },
                    "notes": { "type": "string", "description": "Anything else agreed on the call" },
                },
                "required": ["date", "time"],
            },
        },
    })
}

#[async_trait]
impl CallProvider for VapiProvider {
    fn name(&self) -> &'static str {
        "vapi"
    }

    async fn place_call(&self, call: &OutboundCall) -> Result<PlacedCall, ProviderError> {
        let request = self
            .client
            .post(endpoint(&self.base_url, "call/phone"))
            .bearer_auth(&self.api_key)
            .json(&self.payload(call));
        let raw = send_json(request).await?;
        Ok(PlacedCall {
            call_id: call_id_from(&raw, &["id"])?,
            agent_id: self.assistant_id.clone(),
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calls::stub::StubEndpoint;
    use axum::http::StatusCode;

    fn provider(base_url: &str) -> VapiProvider {
        VapiProvider::new(
            Client::new(),
            base_url.to_string(),
            "vapi-key".to_string(),
            "phone-1".to_string(),
            "assistant-1".to_string(),
        )
    }

    fn call() -> OutboundCall {
        OutboundCall {
            inquiry_id: None,
            phone: "+919876543210".to_string(),
            customer_name: Some("Asha".to_string()),
            preferred_area: Some("Worli".to_string()),
            budget: None,
            property_context: "- Urban Heights (Worli): 3 BHK, ₹ 4 Cr".to_string(),
        }
    }

    #[tokio::test]
    async fn posts_overridden_assistant() {
        let stub = StubEndpoint::start(StatusCode::CREATED, json!({ "id": "vapi-call-1" })).await;
        let placed = provider(&stub.base_url).place_call(&call()).await.unwrap();
        assert_eq!(placed.call_id, "vapi-call-1");
        assert_eq!(placed.agent_id, "assistant-1");

        let requests = stub.requests().await;
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.path, "/call/phone");
        assert_eq!(sent.headers["authorization"], "Bearer vapi-key");
        assert_eq!(sent.body["customer"]["number"], "+919876543210");
        let overrides = &sent.body["assistantOverrides"];
        assert_eq!(overrides["firstMessage"], "Hello, am I speaking with Asha?");
        assert_eq!(
            overrides["model"]["tools"][0]["function"]["name"],
            "schedule_appointment"
        );
        let system = overrides["model"]["messages"][0]["content"].as_str().unwrap();
        assert!(system.contains("Urban Heights"));
        assert_eq!(overrides["metadata"]["budget"], "Not specified");
    }

    #[tokio::test]
    async fn surfaces_rejection_body() {
        let stub = StubEndpoint::start(
            StatusCode::BAD_REQUEST,
            json!({ "message": "customer.number must be E.164" }),
        )
        .await;
        let err = provider(&stub.base_url).place_call(&call()).await.unwrap_err();
        match err {
            ProviderError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("E.164"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
