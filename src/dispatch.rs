//! Session registry and event dispatch
//!
//! Tracks every live conversation and routes inbound webhook events to the
//! right one. The registry lock guards only the map; each conversation sits
//! behind its own mutex, so events for one call apply strictly one at a
//! time while different calls proceed in parallel.

use crate::call_tree::{CallParams, Conversation, Directive, EventArgs, Script, TransitionError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no active session for conversation {0:?}")]
    UnknownSession(String),

    #[error("conversation {0:?} already has an active session")]
    DuplicateId(String),
}

/// Everything [`Dispatcher::handle`] can surface. All of it is the
/// caller's problem to report; the core never retries on its own.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Live conversations keyed by their opaque conversation id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<Conversation>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh conversation. The id must not be in use.
    pub async fn create(
        &self,
        id: &str,
        script: Arc<Script>,
        params: CallParams,
    ) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(id) {
            return Err(SessionError::DuplicateId(id.to_string()));
        }
        let conversation = Conversation::new(id, script, params);
        sessions.insert(id.to_string(), Arc::new(Mutex::new(conversation)));
        tracing::debug!(conversation_id = %id, active = sessions.len(), "Session registered");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Arc<Mutex<Conversation>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))
    }

    pub async fn remove(&self, id: &str) -> Result<Arc<Mutex<Conversation>>, SessionError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))
    }
}

/// Routes inbound events to conversations and advances each state machine
/// exactly once per event.
#[derive(Default)]
pub struct Dispatcher {
    registry: SessionRegistry,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            registry: SessionRegistry::new(),
        }
    }

    /// Register a conversation. Called once the provider has accepted the
    /// call, never speculatively.
    pub async fn create_session(
        &self,
        id: &str,
        script: Arc<Script>,
        params: CallParams,
    ) -> Result<(), SessionError> {
        let script_name = script.name().to_string();
        self.registry.create(id, script, params).await?;
        tracing::info!(conversation_id = %id, script = %script_name, "Session created");
        Ok(())
    }

    /// Apply one inbound event to the named conversation and return the
    /// directives produced by the state it lands in, in order.
    pub async fn handle(
        &self,
        id: &str,
        event: &str,
        args: &EventArgs,
    ) -> Result<Vec<Directive>, DispatchError> {
        let session = self.registry.get(id).await?;
        let mut conversation = session.lock().await;
        match conversation.fire(event, args) {
            Ok(directives) => {
                tracing::info!(
                    conversation_id = %id,
                    event = %event,
                    state = %conversation.current_state(),
                    directives = directives.len(),
                    "Event dispatched"
                );
                Ok(directives)
            }
            Err(err) => {
                tracing::warn!(
                    conversation_id = %id,
                    event = %event,
                    state = %conversation.current_state(),
                    error = %err,
                    "Event rejected"
                );
                Err(err.into())
            }
        }
    }

    /// Drop a conversation on the provider's call-ended signal.
    pub async fn end_session(&self, id: &str) -> Result<(), SessionError> {
        let session = self.registry.remove(id).await?;
        let conversation = session.lock().await;
        let duration = Utc::now() - conversation.started_at();
        tracing::info!(
            conversation_id = %id,
            final_state = %conversation.current_state(),
            duration_s = duration.num_seconds(),
            "Session ended"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_tree::StateEntry;

    /// a -> b on "advance", b -> c on "finish"; b speaks.
    fn walk_script() -> Arc<Script> {
        Arc::new(
            Script::builder("walk")
                .initial_state("a")
                .state("b")
                .state("c")
                .on_enter("b", |_, _| {
                    StateEntry::new(vec![Directive::speak("in b")])
                })
                .transition("advance", "a", "b")
                .transition("finish", "b", "c")
                .build()
                .unwrap(),
        )
    }

    /// s0 -> s1 -> ... -> s{len-1}, all on "next".
    fn chain_script(len: usize) -> Arc<Script> {
        let mut builder = Script::builder("chain").initial_state("s0");
        for i in 1..len {
            builder = builder.state(format!("s{i}"));
        }
        for i in 0..len - 1 {
            builder = builder.transition("next", format!("s{i}"), format!("s{}", i + 1));
        }
        Arc::new(builder.build().unwrap())
    }

    #[tokio::test]
    async fn test_create_and_handle() {
        let dispatcher = Dispatcher::new();
        dispatcher
            .create_session("c1", walk_script(), CallParams::new())
            .await
            .unwrap();

        let directives = dispatcher
            .handle("c1", "advance", &EventArgs::new())
            .await
            .unwrap();
        assert_eq!(directives, vec![Directive::speak("in b")]);
    }

    #[tokio::test]
    async fn test_duplicate_session_id_rejected() {
        let dispatcher = Dispatcher::new();
        dispatcher
            .create_session("c1", walk_script(), CallParams::new())
            .await
            .unwrap();
        let err = dispatcher
            .create_session("c1", walk_script(), CallParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::DuplicateId(_)));
    }

    #[tokio::test]
    async fn test_handle_unknown_session() {
        let dispatcher = Dispatcher::new();
        let err = dispatcher
            .handle("ghost", "advance", &EventArgs::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Session(SessionError::UnknownSession(_))
        ));
    }

    #[tokio::test]
    async fn test_transition_error_passes_through() {
        let dispatcher = Dispatcher::new();
        dispatcher
            .create_session("c1", walk_script(), CallParams::new())
            .await
            .unwrap();
        let err = dispatcher
            .handle("c1", "finish", &EventArgs::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Transition(TransitionError::UnknownTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_end_session_removes_conversation() {
        let dispatcher = Dispatcher::new();
        dispatcher
            .create_session("c1", walk_script(), CallParams::new())
            .await
            .unwrap();
        dispatcher.end_session("c1").await.unwrap();

        let err = dispatcher
            .handle("c1", "advance", &EventArgs::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Session(SessionError::UnknownSession(_))
        ));
        assert!(matches!(
            dispatcher.end_session("c1").await.unwrap_err(),
            SessionError::UnknownSession(_)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_events_on_one_conversation_serialize() {
        // "next" is registered from every non-final chain state, so each of
        // the n concurrent fires is legal from exactly the state it finds.
        // If fires ever interleaved mid-transition some would observe a
        // half-moved conversation and fail; serialized, all n succeed and
        // the conversation ends at the end of the chain.
        let n = 8;
        let dispatcher = Arc::new(Dispatcher::new());
        dispatcher
            .create_session("c1", chain_script(n + 1), CallParams::new())
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for _ in 0..n {
            let dispatcher = dispatcher.clone();
            tasks.push(tokio::spawn(async move {
                dispatcher.handle("c1", "next", &EventArgs::new()).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let session = dispatcher.registry.get("c1").await.unwrap();
        let conversation = session.lock().await;
        assert_eq!(conversation.current_state(), format!("s{n}"));
    }

    #[tokio::test]
    async fn test_conversations_are_independent() {
        let dispatcher = Arc::new(Dispatcher::new());
        let script = walk_script();
        dispatcher
            .create_session("c1", script.clone(), CallParams::new())
            .await
            .unwrap();
        dispatcher
            .create_session("c2", script, CallParams::new())
            .await
            .unwrap();

        let first = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.handle("c1", "advance", &EventArgs::new()).await
            })
        };
        first.await.unwrap().unwrap();
        dispatcher
            .handle("c1", "finish", &EventArgs::new())
            .await
            .unwrap();

        // c2 never moved.
        let session = dispatcher.registry.get("c2").await.unwrap();
        assert_eq!(session.lock().await.current_state(), "a");
        let directives = dispatcher
            .handle("c2", "advance", &EventArgs::new())
            .await
            .unwrap();
        assert_eq!(directives, vec![Directive::speak("in b")]);
    }
}
