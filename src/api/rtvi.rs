//! RTVI wire translation
//!
//! The voice pipeline consumes RTVI messages: each directive becomes one
//! labeled event whose payload the target service understands. The shapes
//! here are fixed by the pipeline's tts and llm services; tests pin them
//! exactly so a refactor cannot silently change the wire.

use crate::call_tree::{Directive, ToolSpec};
use serde_json::{json, Map, Value};

/// One event in the pipeline's dialect: an SSE label plus a JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RtviEvent {
    pub label: &'static str,
    pub payload: Value,
}

/// Translate a directive sequence, preserving order.
pub fn to_events(directives: &[Directive]) -> Vec<RtviEvent> {
    directives.iter().map(to_event).collect()
}

fn to_event(directive: &Directive) -> RtviEvent {
    match directive {
        Directive::Speak {
            text,
            persist,
            allow_interrupt,
        } => RtviEvent {
            label: "action",
            payload: action(
                "tts",
                "say",
                vec![
                    argument("text", json!(text)),
                    argument("save", json!(persist)),
                    argument("interrupt", json!(allow_interrupt)),
                ],
            ),
        },

        Directive::ConfigureTools { tools } => RtviEvent {
            label: "action",
            payload: action(
                "llm",
                "set_context",
                vec![
                    argument("tools", Value::Array(tools.iter().map(tool_schema).collect())),
                    argument("run_immediately", json!(false)),
                ],
            ),
        },

        Directive::AppendSystemMessage {
            role,
            content,
            run_immediately,
        } => RtviEvent {
            label: "action",
            payload: action(
                "llm",
                "append_to_messages",
                vec![
                    argument("messages", json!([{ "role": role, "content": content }])),
                    argument("run_immediately", json!(run_immediately)),
                ],
            ),
        },

        Directive::UpdateServiceConfig { service, options } => RtviEvent {
            label: "update-config",
            payload: json!({
                "config": [ { "service": service, "options": options } ],
            }),
        },

        Directive::FunctionResult {
            function_name,
            tool_call_id,
            arguments,
            result,
        } => RtviEvent {
            label: "action",
            payload: action(
                "llm",
                "function_result",
                vec![
                    argument("function_name", json!(function_name)),
                    argument("tool_call_id", json!(tool_call_id)),
                    argument("arguments", arguments.clone()),
                    argument("result", result.clone()),
                ],
            ),
        },
    }
}

fn action(service: &str, name: &str, arguments: Vec<Value>) -> Value {
    json!({ "service": service, "action": name, "arguments": arguments })
}

fn argument(name: &str, value: Value) -> Value {
    json!({ "name": name, "value": value })
}

/// OpenAI-style function schema for one tool.
fn tool_schema(tool: &ToolSpec) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for param in &tool.parameters {
        properties.insert(
            param.name.clone(),
            json!({
                "type": param.kind.as_str(),
                "description": param.description,
            }),
        );
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            },
        },
    })
}
