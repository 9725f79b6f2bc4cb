//! Call-tree state machine
//!
//! The core of the service: a [`Script`] declares named states and named
//! transition events, a [`Conversation`] is one running instantiation of a
//! script bound to per-call parameters. Entering a state emits an ordered
//! [`Directive`] sequence for the voice pipeline; everything here is pure
//! and synchronous, with transport concerns kept out.

mod conversation;
mod directive;
mod script;

#[cfg(test)]
mod proptests;

pub use conversation::{Conversation, TransitionError};
pub use directive::{
    Directive, ParamKind, ParamSpec, ServiceOption, StateEntry, ToolSpec,
};
pub use script::{CallParams, EventArgs, Script, ScriptError};
