//! Opaque state container

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Entity;

/// A bag of opaque JSON data
///
/// The container never looks inside its payload. It starts out as an empty
/// object and is only ever replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateContainer {
    data: Value,
}

impl StateContainer {
    pub fn new(data: Value) -> Self {
        Self { data }
    }
}

impl Default for StateContainer {
    fn default() -> Self {
        Self {
            data: Value::Object(Map::new()),
        }
    }
}

impl Entity for StateContainer {
    fn state(&self) -> &Value {
        &self.data
    }

    fn set_state(&mut self, state: Value) {
        self.data = state;
    }
}

/// Per-player action state, understood only by the World and Player services
pub type Action = StateContainer;

/// Per-team state
pub type Team = StateContainer;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_as_empty_object() {
        let container = StateContainer::default();
        assert_eq!(container.json(), json!({}));
    }

    #[test]
    fn set_state_replaces_whole_payload() {
        let mut container = StateContainer::new(json!({"x": 1, "y": 2, "action": "move"}));
        container.set_state(json!({"x": 5}));

        // No field from the previous payload survives
        assert_eq!(container.json(), json!({"x": 5}));
    }

    #[test]
    fn payload_is_passed_through_untouched() {
        let payload = json!([1, "two", {"three": null}]);
        let container = StateContainer::new(payload.clone());
        assert_eq!(container.json(), payload);
        assert_eq!(serde_json::to_value(&container).unwrap(), payload);
    }
}
