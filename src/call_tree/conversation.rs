//! One running call
//!
//! A conversation binds a shared script to per-call parameters and tracks
//! the current state plus the directives produced by the most recent state
//! entry. All mutation happens through [`Conversation::fire`].

use super::directive::Directive;
use super::script::{CallParams, EventArgs, Script};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Why an inbound event could not be applied.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The script registers the event somewhere, just not from the state
    /// the conversation is in. Usually the LLM calling a function that
    /// belongs to a different page of the script.
    #[error("no transition for event {event:?} from state {state:?}")]
    UnknownTransition { state: String, event: String },

    /// The script registers no transition under this event name at all.
    /// Points at a script/tool-schema mismatch rather than bad timing.
    #[error("script {script:?} defines no event {event:?}")]
    UnknownEvent { script: String, event: String },
}

/// One active call running a script.
#[derive(Debug)]
pub struct Conversation {
    id: String,
    script: Arc<Script>,
    current_state: String,
    params: CallParams,
    /// Output of the most recent state entry, cleared on every exit.
    directives: Vec<Directive>,
    started_at: DateTime<Utc>,
}

impl Conversation {
    /// Seat a new conversation in the script's initial state, running the
    /// initial state's entry action if it has one.
    pub fn new(id: impl Into<String>, script: Arc<Script>, params: CallParams) -> Self {
        let id = id.into();
        let initial = script.initial_state().to_string();
        let entry = script.run_entry(&initial, &params, &EventArgs::new());
        if let Some(label) = &entry.disposition {
            tracing::info!(
                conversation_id = %id,
                state = %initial,
                disposition = %label,
                "Disposition recorded"
            );
        }
        Self {
            id,
            script,
            current_state: initial,
            params,
            directives: entry.directives,
            started_at: Utc::now(),
        }
    }

    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    #[allow(dead_code)] // State inspection used by tests
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Apply one named event. On success the conversation has exited the
    /// old state (dropping its directives), moved, run the new state's
    /// entry action, and stored its output; the same directives are
    /// returned in order. On failure nothing changes.
    pub fn fire(
        &mut self,
        event: &str,
        args: &EventArgs,
    ) -> Result<Vec<Directive>, TransitionError> {
        let target = match self.script.target(&self.current_state, event) {
            Some(target) => target.to_string(),
            None if self.script.knows_event(event) => {
                return Err(TransitionError::UnknownTransition {
                    state: self.current_state.clone(),
                    event: event.to_string(),
                });
            }
            None => {
                return Err(TransitionError::UnknownEvent {
                    script: self.script.name().to_string(),
                    event: event.to_string(),
                });
            }
        };

        // Exit before entry: a static target must see an empty sequence,
        // never the previous state's leftovers.
        self.directives.clear();
        let from = std::mem::replace(&mut self.current_state, target);

        let entry = self.script.run_entry(&self.current_state, &self.params, args);
        if let Some(label) = &entry.disposition {
            tracing::info!(
                conversation_id = %self.id,
                state = %self.current_state,
                disposition = %label,
                "Disposition recorded"
            );
        }
        tracing::debug!(
            conversation_id = %self.id,
            event = %event,
            from = %from,
            to = %self.current_state,
            directives = entry.directives.len(),
            "Transition applied"
        );

        self.directives.clone_from(&entry.directives);
        Ok(entry.directives)
    }
}
