//! Outbound AI voice calls.
//!
//! Every voice platform is reached through [`CallProvider`]. Exactly one
//! adapter is active per deployment, chosen by `CALL_PROVIDER`.

pub mod bolna;
pub mod elevenlabs;
pub mod local;
pub mod orchestrator;
pub mod phone;
pub mod prompt;
pub mod vapi;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{CallProviderKind, CallSettings};
use crate::error::AppError;

pub use orchestrator::{initiate_call, CallRequest, InitiatedCall};

/// Everything a provider needs to dial a lead.
#[derive(Debug, Clone)]
pub struct OutboundCall {
    pub inquiry_id: Option<Uuid>,
    /// International form, e.g. `+919876543210`.
    pub phone: String,
    pub customer_name: Option<String>,
    pub preferred_area: Option<String>,
    pub budget: Option<String>,
    pub property_context: String,
}

impl OutboundCall {
    pub fn display_name(&self) -> &str {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("Sir/Madam")
    }
}

#[derive(Debug, Clone)]
pub struct PlacedCall {
    pub call_id: String,
    pub agent_id: String,
    pub raw: Value,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider responded with {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider response did not include a call id: {0}")]
    MissingCallId(String),
}

impl From<ProviderError> for AppError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::Rejected { status, body } => AppError::provider(status, body),
            other => AppError::new(StatusCode::BAD_GATEWAY, other.to_string()),
        }
    }
}

#[async_trait]
pub trait CallProvider: Send + Sync + 'static {
    /// Short identifier recorded on call logs.
    fn name(&self) -> &'static str;

    async fn place_call(&self, call: &OutboundCall) -> Result<PlacedCall, ProviderError>;
}

pub fn build_provider(settings: &CallSettings) -> Result<Arc<dyn CallProvider>> {
    let client = http_client(settings)?;
    let provider: Arc<dyn CallProvider> = match settings.provider {
        CallProviderKind::Local => Arc::new(local::LocalAgentProvider::new(
            client,
            settings.voice_agent_url.clone(),
        )),
        CallProviderKind::Vapi => Arc::new(vapi::VapiProvider::new(
            client,
            settings.vapi_base_url.clone(),
            required(&settings.vapi_api_key, "VAPI_API_KEY", settings.provider)?,
            required(
                &settings.vapi_phone_number_id,
                "VAPI_PHONE_NUMBER_ID",
                settings.provider,
            )?,
            required(&settings.vapi_assistant_id, "VAPI_ASSISTANT_ID", settings.provider)?,
        )),
        CallProviderKind::ElevenLabs => Arc::new(elevenlabs::ElevenLabsProvider::new(
            client,
            settings.elevenlabs_base_url.clone(),
            required(
                &settings.elevenlabs_api_key,
                "ELEVENLABS_API_KEY",
                settings.provider,
            )?,
            required(
                &settings.elevenlabs_agent_id,
                "ELEVENLABS_AGENT_ID",
                settings.provider,
            )?,
            required(
                &settings.elevenlabs_agent_phone_number_id,
                "ELEVENLABS_AGENT_PHONE_NUMBER_ID",
                settings.provider,
            )?,
        )),
        CallProviderKind::Bolna => Arc::new(bolna::BolnaProvider::new(
            client,
            settings.bolna_base_url.clone(),
            required(&settings.bolna_api_key, "BOLNA_API_KEY", settings.provider)?,
            required(&settings.bolna_agent_id, "BOLNA_AGENT_ID", settings.provider)?,
        )),
    };
    Ok(provider)
}

fn http_client(settings: &CallSettings) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(secs) = settings.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("failed to build provider HTTP client")
}

fn required(value: &Option<String>, name: &str, provider: CallProviderKind) -> Result<String> {
    value
        .as_ref()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .with_context(|| format!("{name} must be set when CALL_PROVIDER={provider}"))
}

/// Sends a request and returns the provider's JSON body. Non-2xx answers are
/// surfaced with their status and raw text. Non-JSON success bodies are
/// wrapped as `{"raw": ...}`.
pub(crate) async fn send_json(request: RequestBuilder) -> Result<Value, ProviderError> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::Rejected {
            status: status.as_u16(),
            body: text,
        });
    }

    Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text })))
}

/// First non-empty string (or number) found under any of `keys`.
pub(crate) fn call_id_from(body: &Value, keys: &[&str]) -> Result<String, ProviderError> {
    keys.iter()
        .filter_map(|key| body.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| ProviderError::MissingCallId(body.to_string()))
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
pub(crate) mod stub {
    use std::sync::Arc;

    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode, Uri},
        Json, Router,
    };
    use serde_json::Value;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone)]
    pub struct Captured {
        pub path: String,
        pub headers: HeaderMap,
        pub body: Value,
    }

    #[derive(Clone)]
    struct StubState {
        status: StatusCode,
        reply: Value,
        captured: Arc<Mutex<Vec<Captured>>>,
    }

    /// A throwaway HTTP endpoint that records each JSON request and answers
    /// with a fixed status and body.
    pub struct StubEndpoint {
        pub base_url: String,
        captured: Arc<Mutex<Vec<Captured>>>,
    }

    impl StubEndpoint {
        pub async fn start(status: StatusCode, reply: Value) -> Self {
            let captured = Arc::new(Mutex::new(Vec::new()));
            let state = StubState {
                status,
                reply,
                captured: captured.clone(),
            };
            let app = Router::new().fallback(record).with_state(state);
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind stub listener");
            let addr = listener.local_addr().expect("stub address");
            tokio::spawn(async move {
                axum::serve(listener, app).await.expect("stub server");
            });
            Self {
                base_url: format!("http://{addr}"),
                captured,
            }
        }

        pub async fn requests(&self) -> Vec<Captured> {
            self.captured.lock().await.clone()
        }
    }

    async fn record(
        State(state): State<StubState>,
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        state.captured.lock().await.push(Captured {
            path: uri.path().to_string(),
            headers,
            body,
        });
        (state.status, Json(state.reply.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_id_prefers_first_present_key() {
        let body = json!({ "conversation_id": "", "callSid": "CA123" });
        assert_eq!(
            call_id_from(&body, &["conversation_id", "callSid"]).unwrap(),
            "CA123"
        );
        assert!(matches!(
            call_id_from(&json!({}), &["id"]),
            Err(ProviderError::MissingCallId(_))
        ));
    }

    #[test]
    fn endpoint_joins_without_double_slashes() {
        assert_eq!(endpoint("http://agent:8000/", "/start-call"), "http://agent:8000/start-call");
    }

    #[test]
    fn missing_credentials_fail_provider_build() {
        let mut settings = CallSettings::local("http://localhost:8000");
        settings.provider = CallProviderKind::Vapi;
        settings.vapi_api_key = Some("key".to_string());
        let err = build_provider(&settings).err().expect("missing vapi ids");
        assert!(err.to_string().contains("VAPI_PHONE_NUMBER_ID"));
    }

    #[test]
    fn rejected_call_keeps_provider_status() {
        let err: AppError = ProviderError::Rejected {
            status: 422,
            body: "{\"message\":\"bad number\"}".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message(), "Failed to initiate call");
    }

    #[test]
    fn display_name_falls_back_for_blank_names() {
        let mut call = OutboundCall {
            inquiry_id: None,
            phone: "+919876543210".to_string(),
            customer_name: Some("  ".to_string()),
            preferred_area: None,
            budget: None,
            property_context: String::new(),
        };
        assert_eq!(call.display_name(), "Sir/Madam");
        call.customer_name = Some("Asha".to_string());
        assert_eq!(call.display_name(), "Asha");
    }
}
