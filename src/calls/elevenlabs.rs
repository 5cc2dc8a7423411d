use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{call_id_from, endpoint, prompt, send_json, CallProvider, OutboundCall, PlacedCall, ProviderError};

/// ElevenLabs conversational agent dialling out through its Twilio bridge.
pub struct ElevenLabsProvider {
    client: Client,
    base_url: String,
    api_key: String,
    agent_id: String,
    agent_phone_number_id: String,
}

impl ElevenLabsProvider {
    pub fn new(
        client: Client,
        base_url: String,
        api_key: String,
        agent_id: String,
        agent_phone_number_id: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            agent_id,
            agent_phone_number_id,
        }
    }

    fn payload(&self, call: &OutboundCall) -> Value {
        let name = call.display_name();
        json!({
            "agent_id": self.agent_id,
            "agent_phone_number_id": self.agent_phone_number_id,
            "to_number": call.phone,
            "conversation_initiation_client_data": {
                "dynamic_variables": {
                    "customer_name": name,
                    "preferred_area": call.preferred_area.as_deref().unwrap_or("any area"),
                    "budget": call.budget.as_deref().unwrap_or("flexible"),
                    "property_context": call.property_context,
                },
            },
            "first_message": prompt::opening_line(
                name,
                call.preferred_area.as_deref(),
                call.budget.as_deref(),
            ),
        })
    }
}

#[async_trait]
impl CallProvider for ElevenLabsProvider {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn place_call(&self, call: &OutboundCall) -> Result<PlacedCall, ProviderError> {
        let request = self
            .client
            .post(endpoint(&self.base_url, "v1/convai/twilio/outbound_call"))
            .header("xi-api-key", &self.api_key)
            .json(&self.payload(call));
        let raw = send_json(request).await?;
        Ok(PlacedCall {
            call_id: call_id_from(&raw, &["conversation_id", "callSid"])?,
            agent_id: self.agent_id.clone(),
            raw,
        })
    }
}
