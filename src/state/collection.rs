//! Collections of entities indexed by identifier

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::Entity;

/// Identifier of an entity within its collection
pub type Identifier = u64;

/// Entities indexed by identifier
///
/// Identifiers are unique. Iteration and serialisation follow insertion order,
/// which only matters for display and for the order peers are contacted in.
#[derive(Debug, Clone, PartialEq)]
pub struct States<T> {
    items: BTreeMap<Identifier, T>,
    order: Vec<Identifier>,
}

impl<T> States<T> {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Build one default entity per identifier
    ///
    /// Repeated identifiers collapse onto the first occurrence.
    pub fn from_identifiers<I>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = Identifier>,
        T: Default,
    {
        let mut states = Self::new();
        for identifier in identifiers {
            if !states.contains(identifier) {
                states.insert(identifier, T::default());
            }
        }
        states
    }

    /// Insert or replace an entity, keeping the position of an existing one
    pub fn insert(&mut self, identifier: Identifier, item: T) -> Option<T> {
        let previous = self.items.insert(identifier, item);
        if previous.is_none() {
            self.order.push(identifier);
        }
        previous
    }

    pub fn get(&self, identifier: Identifier) -> Option<&T> {
        self.items.get(&identifier)
    }

    pub fn get_mut(&mut self, identifier: Identifier) -> Option<&mut T> {
        self.items.get_mut(&identifier)
    }

    pub fn contains(&self, identifier: Identifier) -> bool {
        self.items.contains_key(&identifier)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Identifiers in insertion order
    pub fn ids(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.order.iter().copied()
    }

    /// Entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Identifier, &T)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.items.get(id).map(|item| (*id, item)))
    }
}

impl<T: Entity> States<T> {
    /// Wire form: an object keyed by the decimal identifier
    pub fn json(&self) -> Value {
        let data: Map<String, Value> = self
            .iter()
            .map(|(id, item)| (id.to_string(), item.json()))
            .collect();
        Value::Object(data)
    }

    /// Replace the state stored under `identifier`, creating the entry if needed
    pub fn merge(&mut self, identifier: Identifier, state: Value)
    where
        T: Default,
    {
        match self.items.get_mut(&identifier) {
            Some(item) => item.set_state(state),
            None => {
                let mut item = T::default();
                item.set_state(state);
                self.insert(identifier, item);
            }
        }
    }

    /// Merge a whole collection in wire form
    ///
    /// Keys that are not identifiers are skipped. Returns how many entries
    /// were merged; a non-object value merges nothing.
    pub fn merge_json(&mut self, data: &Value) -> usize
    where
        T: Default,
    {
        let Some(entries) = data.as_object() else {
            return 0;
        };

        let mut merged = 0;
        for (key, state) in entries {
            if let Ok(identifier) = key.parse::<Identifier>() {
                self.merge(identifier, state.clone());
                merged += 1;
            }
        }
        merged
    }
}

impl<T> Default for States<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateContainer;
    use serde_json::json;

    #[test]
    fn from_identifiers_builds_one_default_each() {
        let states: States<StateContainer> = States::from_identifiers([3, 0, 3, 1]);

        assert_eq!(states.len(), 3);
        assert_eq!(states.ids().collect::<Vec<_>>(), vec![3, 0, 1]);
        assert_eq!(states.json(), json!({"0": {}, "1": {}, "3": {}}));
    }

    #[test]
    fn wire_form_follows_insertion_order() {
        let mut states: States<StateContainer> = States::from_identifiers([3, 0]);
        states.merge(1, json!({"x": 1}));

        assert_eq!(
            serde_json::to_string(&states.json()).unwrap(),
            r#"{"3":{},"0":{},"1":{"x":1}}"#
        );
    }

    #[test]
    fn insert_keeps_original_position() {
        let mut states: States<StateContainer> = States::new();
        states.insert(5, StateContainer::default());
        states.insert(2, StateContainer::default());
        let previous = states.insert(5, StateContainer::new(json!({"x": 1})));

        assert!(previous.is_some());
        assert_eq!(states.ids().collect::<Vec<_>>(), vec![5, 2]);
        assert_eq!(states.get(5).unwrap().json(), json!({"x": 1}));
    }

    #[test]
    fn merge_replaces_entry_wholesale() {
        let mut states: States<StateContainer> = States::from_identifiers([0]);
        states.merge(0, json!({"x": 1, "y": 2, "action": "eat"}));
        states.merge(0, json!({"x": 3}));

        assert_eq!(states.get(0).unwrap().json(), json!({"x": 3}));
    }

    #[test]
    fn merge_creates_missing_entry() {
        let mut states: States<StateContainer> = States::from_identifiers([0]);
        states.merge(7, json!({"score": 1}));

        assert!(states.contains(7));
        assert_eq!(states.ids().collect::<Vec<_>>(), vec![0, 7]);
    }

    #[test]
    fn merging_own_json_is_a_no_op() {
        let mut states: States<StateContainer> = States::from_identifiers([2, 0]);
        states.merge(2, json!({"x": 4, "y": 1, "action": "move"}));
        states.merge(0, json!({"nested": {"list": [1, 2, 3]}}));

        let before = states.clone();
        let wire = states.json();
        let merged = states.merge_json(&wire);

        assert_eq!(merged, 2);
        assert_eq!(states, before);
    }

    #[test]
    fn merge_json_skips_non_identifier_keys() {
        let mut states: States<StateContainer> = States::new();
        let merged = states.merge_json(&json!({"1": {"a": 1}, "not-an-id": {}, "-3": {}}));

        assert_eq!(merged, 1);
        assert_eq!(states.ids().collect::<Vec<_>>(), vec![1]);
        assert_eq!(states.merge_json(&json!([1, 2])), 0);
    }
}
