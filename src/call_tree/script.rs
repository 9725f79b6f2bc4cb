//! Script definitions
//!
//! A script is the static description of one conversation flow: a set of
//! named states, exactly one of them initial, and named transition events
//! wiring states together. Scripts are declared through [`ScriptBuilder`]
//! and validated once at construction. A validated script is immutable and
//! shared read-only by every conversation running it.

use super::directive::StateEntry;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Arguments carried by one inbound event, as sent by the LLM service.
pub type EventArgs = serde_json::Map<String, Value>;

/// Entry action: a pure producer mapping the bound call parameters and the
/// triggering event's arguments to the state's output. Producers must not
/// perform I/O and must be deterministic for the same inputs.
pub type EntryAction = dyn Fn(&CallParams, &EventArgs) -> StateEntry + Send + Sync;

/// Structural problems detected when a script is built. All of these are
/// authoring mistakes and are surfaced before any call can run the script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script {script:?} declares no initial state")]
    NoInitialState { script: String },

    #[error("script {script:?} marks both {first:?} and {second:?} as initial")]
    MultipleInitialStates {
        script: String,
        first: String,
        second: String,
    },

    #[error("script {script:?} declares state {state:?} more than once")]
    DuplicateState { script: String, state: String },

    #[error("script {script:?} references undeclared state {state:?}")]
    UndeclaredState { script: String, state: String },

    #[error("script {script:?} registers event {event:?} twice from state {state:?}")]
    DuplicateTransition {
        script: String,
        state: String,
        event: String,
    },

    #[error("script {script:?} attaches two entry actions to state {state:?}")]
    DuplicateEntryAction { script: String, state: String },
}

/// Parameters bound to one call (names, documents, ...), closed over by
/// entry actions when they render text.
#[derive(Debug, Clone, Default)]
pub struct CallParams {
    values: HashMap<String, Value>,
}

impl CallParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: serde_json::Map<String, Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// String items of an array parameter. Missing or non-array values
    /// yield an empty list so producers stay infallible.
    pub fn str_values(&self, key: &str) -> Vec<String> {
        self.values
            .get(key)
            .and_then(Value::as_array)
            .map_or_else(Vec::new, |items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
    }
}

/// A validated conversation flow.
pub struct Script {
    name: String,
    initial: String,
    /// State name to optional entry action. Static states carry `None`.
    states: HashMap<String, Option<Arc<EntryAction>>>,
    /// From-state to event name to target state.
    transitions: HashMap<String, HashMap<String, String>>,
    /// Every event name registered anywhere in the script.
    events: HashSet<String>,
}

impl Script {
    pub fn builder(name: impl Into<String>) -> ScriptBuilder {
        ScriptBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_state(&self) -> &str {
        &self.initial
    }

    #[allow(dead_code)] // State inspection used by property tests
    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Whether `event` is registered from any state at all. Distinguishes
    /// a misspelled event from one that is merely invalid right now.
    pub fn knows_event(&self, event: &str) -> bool {
        self.events.contains(event)
    }

    /// Target state for firing `event` from `from`, if registered.
    pub fn target(&self, from: &str, event: &str) -> Option<&str> {
        self.transitions
            .get(from)
            .and_then(|by_event| by_event.get(event))
            .map(String::as_str)
    }

    /// Run a state's entry action. Static states produce an empty entry.
    pub fn run_entry(&self, state: &str, params: &CallParams, args: &EventArgs) -> StateEntry {
        match self.states.get(state).and_then(Option::as_ref) {
            Some(producer) => producer(params, args),
            None => StateEntry::default(),
        }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("name", &self.name)
            .field("initial", &self.initial)
            .field("states", &self.states.len())
            .field("events", &self.events.len())
            .finish()
    }
}

/// Declarative builder for [`Script`]. Declaration order does not matter;
/// everything is checked at [`ScriptBuilder::build`].
pub struct ScriptBuilder {
    name: String,
    states: Vec<String>,
    initials: Vec<String>,
    entries: Vec<(String, Arc<EntryAction>)>,
    transitions: Vec<TransitionDef>,
}

struct TransitionDef {
    event: String,
    from: String,
    to: String,
}

impl ScriptBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            initials: Vec::new(),
            entries: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Declare a state.
    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.states.push(name.into());
        self
    }

    /// Declare the state every conversation starts in.
    pub fn initial_state(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.states.push(name.clone());
        self.initials.push(name);
        self
    }

    /// Attach an entry action to a declared state.
    pub fn on_enter(
        mut self,
        state: impl Into<String>,
        producer: impl Fn(&CallParams, &EventArgs) -> StateEntry + Send + Sync + 'static,
    ) -> Self {
        self.entries.push((state.into(), Arc::new(producer)));
        self
    }

    /// Register `event` as moving a conversation from `from` to `to`. The
    /// same event name may be reused from other states; `from == to` is a
    /// legal self-loop.
    pub fn transition(
        mut self,
        event: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.transitions.push(TransitionDef {
            event: event.into(),
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Validate the declaration and produce an immutable script.
    pub fn build(self) -> Result<Script, ScriptError> {
        let script = self.name;

        let mut states: HashMap<String, Option<Arc<EntryAction>>> = HashMap::new();
        for state in self.states {
            if states.insert(state.clone(), None).is_some() {
                return Err(ScriptError::DuplicateState { script, state });
            }
        }

        let mut initials = self.initials.into_iter();
        let Some(initial) = initials.next() else {
            return Err(ScriptError::NoInitialState { script });
        };
        if let Some(second) = initials.next() {
            return Err(ScriptError::MultipleInitialStates {
                script,
                first: initial,
                second,
            });
        }

        for (state, producer) in self.entries {
            let Some(slot) = states.get_mut(&state) else {
                return Err(ScriptError::UndeclaredState { script, state });
            };
            if slot.is_some() {
                return Err(ScriptError::DuplicateEntryAction { script, state });
            }
            *slot = Some(producer);
        }

        let mut transitions: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut events = HashSet::new();
        for def in self.transitions {
            if !states.contains_key(&def.from) {
                return Err(ScriptError::UndeclaredState {
                    script,
                    state: def.from,
                });
            }
            if !states.contains_key(&def.to) {
                return Err(ScriptError::UndeclaredState {
                    script,
                    state: def.to,
                });
            }
            events.insert(def.event.clone());
            let by_event = transitions.entry(def.from.clone()).or_default();
            if by_event.insert(def.event.clone(), def.to).is_some() {
                return Err(ScriptError::DuplicateTransition {
                    script,
                    state: def.from,
                    event: def.event,
                });
            }
        }

        Ok(Script {
            name: script,
            initial,
            states,
            transitions,
            events,
        })
    }
}
