use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{call_id_from, endpoint, send_json, CallProvider, OutboundCall, PlacedCall, ProviderError};

pub struct BolnaProvider {
    client: Client,
    base_url: String,
    api_key: String,
    agent_id: String,
}

impl BolnaProvider {
    pub fn new(client: Client, base_url: String, api_key: String, agent_id: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            agent_id,
        }
    }

    fn payload(&self, call: &OutboundCall) -> Value {
        json!({
            "agent_id": self.agent_id,
            "recipient_phone_number": call.phone,
            "user_data": {
                "customer_name": call.display_name(),
                "preferred_area": call.preferred_area.as_deref().unwrap_or("any area"),
                "budget": call.budget.as_deref().unwrap_or("flexible"),
                "property_context": call.property_context,
            },
        })
    }
}

#[async_trait]
impl CallProvider for BolnaProvider {
    fn name(&self) -> &'static str {
        "bolna"
    }

    async fn place_call(&self, call: &OutboundCall) -> Result<PlacedCall, ProviderError> {
        let request = self
            .client
            .post(endpoint(&self.base_url, "call"))
            .bearer_auth(&self.api_key)
            .json(&self.payload(call));
        let raw = send_json(request).await?;
        Ok(PlacedCall {
            call_id: call_id_from(&raw, &["execution_id", "call_id"])?,
            agent_id: self.agent_id.clone(),
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calls::stub::StubEndpoint;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn places_call_for_agent() {
        let stub = StubEndpoint::start(
            StatusCode::OK,
            json!({ "message": "done", "status": "queued", "execution_id": "exec-42" }),
        )
        .await;
        let provider = BolnaProvider::new(
            Client::new(),
            stub.base_url.clone(),
            "bolna-key".to_string(),
            "agent-b".to_string(),
        );
        let call = OutboundCall {
            inquiry_id: None,
            phone: "+919421517187".to_string(),
            customer_name: Some("Test User".to_string()),
            preferred_area: Some("Bandra".to_string()),
            budget: Some("5 Cr".to_string()),
            property_context: "No specific properties found.".to_string(),
        };

        let placed = provider.place_call(&call).await.unwrap();
        assert_eq!(placed.call_id, "exec-42");
        assert_eq!(placed.agent_id, "agent-b");

        let sent = &stub.requests().await[0];
        assert_eq!(sent.path, "/call");
        assert_eq!(sent.headers["authorization"], "Bearer bolna-key");
        assert_eq!(sent.body["agent_id"], "agent-b");
        assert_eq!(sent.body["recipient_phone_number"], "+919421517187");
        assert_eq!(sent.body["user_data"]["preferred_area"], "Bandra");
    }

    #[tokio::test]
    async fn unauthorized_is_passed_through() {
        let stub = StubEndpoint::start(StatusCode::UNAUTHORIZED, json!({ "detail": "bad key" })).await;
        let provider = BolnaProvider::new(
            Client::new(),
            stub.base_url.clone(),
            "wrong".to_string(),
            "agent-b".to_string(),
        );
        let call = OutboundCall {
            inquiry_id: None,
            phone: "+919421517187".to_string(),
            customer_name: None,
            preferred_area: None,
            budget: None,
            property_context: String::new(),
        };
        let err = provider.place_call(&call).await.unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { status: 401, .. }));
    }
}
