//! Built-in call flows
//!
//! Each flow module contributes a validated script plus the call-level
//! defaults the start endpoint needs. The library is assembled once at
//! startup; a script that fails validation keeps the service from booting,
//! so dispatch never sees a malformed flow.

pub mod enrollment;
pub mod records;

use crate::call_tree::{CallParams, Script, ScriptError};
use std::collections::HashMap;
use std::sync::Arc;

/// One shipped flow: the script plus its per-call defaults.
pub struct CallFlow {
    pub script: Arc<Script>,
    /// Bound to the conversation when a start request carries no params.
    pub demo_params: CallParams,
    pub system_prompt: &'static str,
}

/// Catalog of every flow this service can run.
pub struct ScriptLibrary {
    flows: HashMap<&'static str, CallFlow>,
}

impl ScriptLibrary {
    /// Assemble the shipped flows, validating each script.
    pub fn standard() -> Result<Self, ScriptError> {
        let mut flows = HashMap::new();
        flows.insert(
            enrollment::NAME,
            CallFlow {
                script: Arc::new(enrollment::script()?),
                demo_params: enrollment::demo_params(),
                system_prompt: enrollment::system_prompt(),
            },
        );
        flows.insert(
            records::NAME,
            CallFlow {
                script: Arc::new(records::script()?),
                demo_params: records::demo_params(),
                system_prompt: records::system_prompt(),
            },
        );
        Ok(Self { flows })
    }

    pub fn get(&self, name: &str) -> Option<&CallFlow> {
        self.flows.get(name)
    }

    /// The flow used when a start request names none.
    pub fn default_flow(&self) -> &CallFlow {
        // Inserted unconditionally by standard().
        &self.flows[records::NAME]
    }

    /// Flow names, sorted for stable logs.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.flows.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
