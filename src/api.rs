//! HTTP API for the switchboard webhook service

mod handlers;
mod rtvi;
mod sse;
mod types;

pub use handlers::create_router;

use crate::dispatch::Dispatcher;
use crate::provider::{BotLauncher, ProviderConfig};
use crate::scripts::ScriptLibrary;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub scripts: Arc<ScriptLibrary>,
    pub provider: Arc<ProviderConfig>,
    pub launcher: Arc<dyn BotLauncher>,
}

impl AppState {
    pub fn new(
        scripts: ScriptLibrary,
        provider: ProviderConfig,
        launcher: Arc<dyn BotLauncher>,
    ) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new()),
            scripts: Arc::new(scripts),
            provider: Arc::new(provider),
            launcher,
        }
    }
}
