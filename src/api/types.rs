//! API request and response types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One function-call notification from the LLM service.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCallRequest {
    pub function_name: String,
    pub tool_call_id: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

/// Request to start a bot session. Field casing follows the telephony
/// provider's webhook payloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartRequest {
    #[allow(dead_code)] // Dial-in metadata echoed by the provider
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[allow(dead_code)] // Dial-in metadata echoed by the provider
    #[serde(rename = "To")]
    pub to: Option<String>,
    #[serde(rename = "callId")]
    pub call_id: Option<String>,
    #[serde(rename = "callDomain")]
    pub call_domain: Option<String>,
    /// Phone number to dial out to.
    pub dialout: Option<String>,
    /// Flow to run; the library default when absent.
    pub script: Option<String>,
    /// Call parameters to bind; the flow's demo set when absent.
    pub params: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub conversation_id: String,
    pub room_url: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct EndResponse {
    pub ended: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub scripts: Vec<&'static str>,
}

/// Envelope for every non-2xx reply.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
