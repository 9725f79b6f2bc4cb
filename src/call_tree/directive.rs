//! Directives produced by state entry actions
//!
//! A directive is one atomic instruction for the external voice/LLM
//! pipeline. Order within a sequence is significant and preserved
//! end-to-end: consumers apply directives in the order returned.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One atomic instruction handed to the voice/LLM pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    /// Synthesize and play `text`.
    Speak {
        text: String,
        /// Keep the utterance in the conversation history.
        persist: bool,
        /// Let user speech cut the utterance off.
        allow_interrupt: bool,
    },

    /// Replace the set of functions the LLM may call.
    ConfigureTools { tools: Vec<ToolSpec> },

    /// Inject an instruction into the LLM's running context.
    AppendSystemMessage {
        role: String,
        content: String,
        /// Act on the instruction now rather than waiting for the next
        /// user turn.
        run_immediately: bool,
    },

    /// Reconfigure one pipeline service (e.g. swap the TTS voice).
    UpdateServiceConfig {
        service: String,
        options: Vec<ServiceOption>,
    },

    /// Report a webhook function-call result back to the LLM.
    FunctionResult {
        function_name: String,
        tool_call_id: String,
        arguments: Value,
        result: Value,
    },
}

impl Directive {
    /// A spoken line with the defaults every scripted utterance uses:
    /// retained in history, not interruptible.
    pub fn speak(text: impl Into<String>) -> Self {
        Directive::Speak {
            text: text.into(),
            persist: true,
            allow_interrupt: false,
        }
    }

    pub fn configure_tools(tools: Vec<ToolSpec>) -> Self {
        Directive::ConfigureTools { tools }
    }

    /// A system-role instruction the LLM should hold until the next user
    /// turn.
    pub fn append_system_message(content: impl Into<String>) -> Self {
        Directive::AppendSystemMessage {
            role: "system".to_string(),
            content: content.into(),
            run_immediately: false,
        }
    }
}

/// A callable function exposed to the LLM while a state is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }
}

/// One typed parameter in a tool's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
}

impl ParamSpec {
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::String,
            description: description.into(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// JSON schema type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    String,
    Number,
    Boolean,
}

impl ParamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }
}

/// A name/value pair in a service reconfiguration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOption {
    pub name: String,
    pub value: Value,
}

impl ServiceOption {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Everything produced by entering a state: the directive sequence for the
/// pipeline, plus an advisory disposition label for call logs. The
/// disposition never reaches the wire and can never fail an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateEntry {
    pub directives: Vec<Directive>,
    pub disposition: Option<String>,
}

impl StateEntry {
    pub fn new(directives: Vec<Directive>) -> Self {
        Self {
            directives,
            disposition: None,
        }
    }

    pub fn with_disposition(mut self, label: impl Into<String>) -> Self {
        self.disposition = Some(label.into());
        self
    }
}
