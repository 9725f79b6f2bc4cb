//! HTTP request handlers

use super::rtvi;
use super::sse::directive_stream;
use super::types::{
    EndResponse, ErrorResponse, FunctionCallRequest, HealthResponse, StartRequest, StartResponse,
};
use super::AppState;
use crate::call_tree::{CallParams, Directive};
use crate::dispatch::{DispatchError, SessionError};
use crate::language;
use crate::provider::{CallRouting, DialinSettings, ProviderError};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        // Start a bot session (browser, dial-in bridge, or dial-out)
        .route("/start", post(start_call))
        // Function-call notifications from the LLM service
        .route("/webhook", post(webhook))
        // The change_language webhook tool; bypasses the call tree
        .route("/language", post(set_language))
        // Provider-side signal that the call hung up
        .route("/call_ended", post(call_ended))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session Start
// ============================================================

async fn start_call(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Result<Json<StartResponse>, AppError> {
    let flow = match &req.script {
        Some(name) => state
            .scripts
            .get(name)
            .ok_or_else(|| AppError::BadRequest(format!("unknown script {name:?}")))?,
        None => state.scripts.default_flow(),
    };

    let conversation_id = uuid::Uuid::new_v4().to_string();
    let routing = CallRouting {
        dialin: req
            .call_id
            .zip(req.call_domain)
            .map(|(call_id, call_domain)| DialinSettings {
                call_id,
                call_domain,
            }),
        dialout: req.dialout,
    };

    let config = state
        .provider
        .bot_config(&conversation_id, flow.system_prompt, &routing);
    let session = state.launcher.start_bot(&config).await?;

    // Register only once the provider has accepted the call; a rejected
    // start leaves no session behind.
    let params = req
        .params
        .map_or_else(|| flow.demo_params.clone(), CallParams::from_map);
    state
        .dispatcher
        .create_session(&conversation_id, flow.script.clone(), params)
        .await?;

    tracing::info!(
        conversation_id = %conversation_id,
        script = %flow.script.name(),
        room_url = %session.room_url,
        "Call started"
    );

    Ok(Json(StartResponse {
        conversation_id,
        room_url: session.room_url,
        token: session.token,
    }))
}

// ============================================================
// Call-Tree Webhook
// ============================================================

async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<FunctionCallRequest>,
) -> Result<impl IntoResponse, AppError> {
    let conversation_id = conversation_id_from(&headers)?;

    let directives = state
        .dispatcher
        .handle(&conversation_id, &req.function_name, &req.arguments)
        .await?;

    Ok(directive_stream(rtvi::to_events(&directives)))
}

// ============================================================
// Language Switching
// ============================================================

async fn set_language(
    Json(req): Json<FunctionCallRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = {
        let requested = req
            .arguments
            .get("language")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::BadRequest("missing language argument".to_string()))?;
        language::profile(requested)
            .ok_or_else(|| AppError::BadRequest(format!("unsupported language {requested:?}")))?
    };

    tracing::info!(language = %profile.name, "Switching call language");

    let directives = vec![
        language::switch_directive(profile),
        Directive::FunctionResult {
            function_name: req.function_name,
            tool_call_id: req.tool_call_id,
            arguments: Value::Object(req.arguments),
            result: json!({ "language": profile.name }),
        },
    ];

    Ok(directive_stream(rtvi::to_events(&directives)))
}

// ============================================================
// Call End
// ============================================================

async fn call_ended(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<EndResponse>, AppError> {
    let conversation_id = conversation_id_from(&headers)?;
    state.dispatcher.end_session(&conversation_id).await?;
    Ok(Json(EndResponse { ended: true }))
}

// ============================================================
// Health & Version
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "switchboard",
        scripts: state.scripts.names(),
    })
}

async fn get_version() -> &'static str {
    concat!("switchboard ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Header Extraction
// ============================================================

fn conversation_id_from(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("conversation-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| AppError::BadRequest("missing conversation-id header".to_string()))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownSession(_) => AppError::NotFound(err.to_string()),
            SessionError::DuplicateId(_) => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Session(err) => err.into(),
            DispatchError::Transition(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingApiKey => AppError::Internal(err.to_string()),
            ProviderError::Http(_)
            | ProviderError::Rejected { .. }
            | ProviderError::MalformedResponse(_) => AppError::BadGateway(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
