//! Generic state containers shared by the orchestrator
//!
//! Everything the orchestrator stores is an [`Entity`]: it holds one opaque
//! JSON payload that is replaced wholesale on merge and forwarded as-is.

pub mod collection;
pub mod container;
pub mod host;

pub use collection::{Identifier, States};
pub use container::{Action, StateContainer, Team};
pub use host::HostReference;

use serde_json::Value;

/// Anything holding an opaque state payload
pub trait Entity {
    /// Last stored payload
    fn state(&self) -> &Value;

    /// Replace the payload wholesale
    fn set_state(&mut self, state: Value);

    /// Payload as sent on the wire
    fn json(&self) -> Value {
        self.state().clone()
    }
}
