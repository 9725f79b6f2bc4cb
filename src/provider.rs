//! Voice-bot provider integration
//!
//! Builds the per-call bot configuration and starts sessions through the
//! provider's REST API. The provider runs the actual voice pipeline; this
//! service only receives its webhooks afterwards. [`BotLauncher`] is the
//! seam that lets request handling run against a fake in tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_START_URL: &str = "https://api.daily.co/v1/bots/start";
const DEFAULT_WEBHOOK_HOST: &str = "http://localhost:8000";
/// Voice every call starts with; language switches replace it.
const DEFAULT_VOICE: &str = "829ccd10-f8b3-43cd-b8a0-4aeaa81f3b30";

const START_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no provider API key configured (set DAILY_API_KEY)")]
    MissingApiKey,

    #[error("bot start request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected bot start ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("could not parse provider response: {0}")]
    MalformedResponse(String),
}

/// Provider connection settings, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub start_url: String,
    /// Public base URL the provider calls back on.
    pub webhook_host: String,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("DAILY_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            start_url: std::env::var("BOT_START_URL")
                .unwrap_or_else(|_| DEFAULT_START_URL.to_string()),
            webhook_host: std::env::var("WEBHOOK_HOST")
                .unwrap_or_else(|_| DEFAULT_WEBHOOK_HOST.to_string()),
        }
    }

    /// The bot configuration payload for one call. Every webhook the bot
    /// sends back carries `conversation_id` in a custom header, which is
    /// how replies find their session.
    pub fn bot_config(
        &self,
        conversation_id: &str,
        system_prompt: &str,
        routing: &CallRouting,
    ) -> Value {
        let webhook = |path: &str| {
            json!({
                "url": format!("{}{path}", self.webhook_host),
                "method": "POST",
                "streaming": true,
                "custom_headers": { "conversation-id": conversation_id },
            })
        };

        let mut config = json!({
            "bot_profile": "voice_2024_10",
            "max_duration": "300",
            "services": { "tts": "cartesia", "llm": "openai" },
            "api_keys": { "openai": self.openai_api_key },
            "webhook_tools": {
                "change_language": webhook("/language"),
                "*": webhook("/webhook"),
            },
            "config": [
                {
                    "service": "tts",
                    "options": [ { "name": "voice", "value": DEFAULT_VOICE } ],
                },
                {
                    "service": "stt",
                    "options": [ { "name": "model", "value": "nova-2-general" } ],
                },
                {
                    "service": "llm",
                    "options": [
                        { "name": "model", "value": "gpt-4o" },
                        {
                            "name": "initial_messages",
                            "value": [
                                {
                                    "role": "system",
                                    "content": [
                                        { "type": "text", "text": system_prompt }
                                    ],
                                }
                            ],
                        },
                        { "name": "run_on_config", "value": false },
                    ],
                },
            ],
        });

        if let Some(dialin) = &routing.dialin {
            config["dialin_settings"] = json!({
                "callId": dialin.call_id,
                "callDomain": dialin.call_domain,
            });
        }
        if let Some(number) = &routing.dialout {
            config["dialout_settings"] = json!([ { "phoneNumber": number } ]);
        }
        config
    }
}

/// How the provider should route the call: a plain browser session when
/// both are absent, otherwise a dial-in bridge or an outbound dial.
#[derive(Debug, Clone, Default)]
pub struct CallRouting {
    pub dialin: Option<DialinSettings>,
    pub dialout: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DialinSettings {
    pub call_id: String,
    pub call_domain: String,
}

/// Accepted call session as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct BotSession {
    pub room_url: String,
    pub token: String,
}

/// Seam between the start endpoint and the provider's REST API.
#[async_trait]
pub trait BotLauncher: Send + Sync {
    async fn start_bot(&self, config: &Value) -> Result<BotSession, ProviderError>;
}

/// Production launcher talking to the hosted bot runner. Built without a
/// key it still boots, and every start attempt reports the missing key.
pub struct DailyLauncher {
    client: Client,
    start_url: String,
    api_key: Option<String>,
}

impl DailyLauncher {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(START_TIMEOUT).build()?;
        Ok(Self {
            client,
            start_url: config.start_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl BotLauncher for DailyLauncher {
    async fn start_bot(&self, config: &Value) -> Result<BotSession, ProviderError> {
        let api_key = self.api_key.as_ref().ok_or(ProviderError::MissingApiKey)?;

        let response = self
            .client
            .post(&self.start_url)
            .bearer_auth(api_key)
            .json(config)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|err| ProviderError::MalformedResponse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            api_key: Some("dk-test".to_string()),
            openai_api_key: Some("sk-test".to_string()),
            start_url: DEFAULT_START_URL.to_string(),
            webhook_host: "https://calls.example.com".to_string(),
        }
    }

    #[test]
    fn test_webhooks_carry_conversation_id() {
        let payload = config().bot_config("conv-42", "prompt", &CallRouting::default());
        for tool in ["change_language", "*"] {
            let hook = &payload["webhook_tools"][tool];
            assert_eq!(
                hook["custom_headers"]["conversation-id"],
                json!("conv-42")
            );
            assert_eq!(hook["streaming"], json!(true));
        }
        assert_eq!(
            payload["webhook_tools"]["*"]["url"],
            json!("https://calls.example.com/webhook")
        );
        assert_eq!(
            payload["webhook_tools"]["change_language"]["url"],
            json!("https://calls.example.com/language")
        );
    }

    #[test]
    fn test_system_prompt_lands_in_initial_messages() {
        let payload = config().bot_config("c", "Be nice.", &CallRouting::default());
        let llm = &payload["config"][2];
        assert_eq!(llm["service"], json!("llm"));
        assert_eq!(
            llm["options"][1]["value"][0]["content"][0]["text"],
            json!("Be nice.")
        );
    }

    #[test]
    fn test_plain_session_has_no_routing() {
        let payload = config().bot_config("c", "p", &CallRouting::default());
        assert!(payload.get("dialin_settings").is_none());
        assert!(payload.get("dialout_settings").is_none());
    }

    #[test]
    fn test_dialout_routing() {
        let routing = CallRouting {
            dialin: None,
            dialout: Some("+15551234567".to_string()),
        };
        let payload = config().bot_config("c", "p", &routing);
        assert_eq!(
            payload["dialout_settings"],
            json!([ { "phoneNumber": "+15551234567" } ])
        );
    }

    #[test]
    fn test_dialin_routing() {
        let routing = CallRouting {
            dialin: Some(DialinSettings {
                call_id: "id-1".to_string(),
                call_domain: "example.daily.co".to_string(),
            }),
            dialout: None,
        };
        let payload = config().bot_config("c", "p", &routing);
        assert_eq!(payload["dialin_settings"]["callId"], json!("id-1"));
        assert_eq!(
            payload["dialin_settings"]["callDomain"],
            json!("example.daily.co")
        );
    }
}
