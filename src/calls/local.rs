use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{call_id_from, endpoint, send_json, CallProvider, OutboundCall, PlacedCall, ProviderError};

pub const LOCAL_AGENT_ID: &str = "local-agent";

/// Self-hosted voice agent exposing `POST /start-call`.
pub struct LocalAgentProvider {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct StartCall<'a> {
    phone: &'a str,
    name: &'a str,
    property_context: &'a str,
}

impl LocalAgentProvider {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl CallProvider for LocalAgentProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn place_call(&self, call: &OutboundCall) -> Result<PlacedCall, ProviderError> {
        let body = StartCall {
            phone: &call.phone,
            name: call.display_name(),
            property_context: &call.property_context,
        };
        let request = self
            .client
            .post(endpoint(&self.base_url, "start-call"))
            .json(&body);
        let raw = send_json(request).await?;
        Ok(PlacedCall {
            call_id: call_id_from(&raw, &["call_id"])?,
            agent_id: LOCAL_AGENT_ID.to_string(),
            raw,
        })
    }
}
