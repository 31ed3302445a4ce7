//! Remote peer reference

use serde_json::Value;

use super::{Entity, StateContainer};

/// Address of a remote service plus the last state it returned
#[derive(Debug, Clone, PartialEq)]
pub struct HostReference {
    host: String,
    path: String,
    last_state: StateContainer,
}

impl HostReference {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            last_state: StateContainer::default(),
        }
    }

    /// Full URL the update is POSTed to (`host` carries the scheme)
    pub fn url(&self) -> String {
        format!("{}{}", self.host, self.path)
    }
}

impl Entity for HostReference {
    fn state(&self) -> &Value {
        self.last_state.state()
    }

    fn set_state(&mut self, state: Value) {
        self.last_state.set_state(state);
    }
}
