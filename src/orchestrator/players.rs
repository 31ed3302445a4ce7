//! Players and player identifier allocation

use std::ops::{Deref, DerefMut};

use serde_json::Value;

use crate::config::{ConfigError, PlayerConfig};
use crate::state::{Entity, HostReference, Identifier, States};

/// A remote player service and what it last told us
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    player_id: Identifier,
    team_id: Identifier,
    endpoint: HostReference,
}

impl Player {
    pub fn new(
        player_id: Identifier,
        team_id: Identifier,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            player_id,
            team_id,
            endpoint: HostReference::new(host, path),
        }
    }

    pub fn player_id(&self) -> Identifier {
        self.player_id
    }

    pub fn team_id(&self) -> Identifier {
        self.team_id
    }

    pub fn endpoint(&self) -> &HostReference {
        &self.endpoint
    }
}

impl Entity for Player {
    fn state(&self) -> &Value {
        self.endpoint.state()
    }

    fn set_state(&mut self, state: Value) {
        self.endpoint.set_state(state);
    }
}

/// Every configured player, keyed by a unique player id
#[derive(Debug, Clone, PartialEq)]
pub struct Players {
    items: States<Player>,
    next_id: Identifier,
}

impl Players {
    /// Allocate ids for the configured players, in order
    ///
    /// A player without an id takes the next free one. A player whose id is
    /// already taken is moved to the next free one. The result depends on the
    /// order of the list and existing config files rely on it.
    ///
    /// Fails if a declared id leaves no room for the id after it.
    pub fn new(descriptors: &[PlayerConfig]) -> Result<Self, ConfigError> {
        let mut items = States::new();
        let mut next_id: Identifier = 0;

        for descriptor in descriptors {
            let mut player_id = descriptor.player_id.unwrap_or(next_id);
            if items.contains(player_id) {
                player_id = next_id;
            }
            if player_id >= next_id {
                next_id = player_id
                    .checked_add(1)
                    .ok_or(ConfigError::PlayerIdOutOfRange(player_id))?;
            }

            let team_id = descriptor.team_id.unwrap_or(0);
            items.insert(
                player_id,
                Player::new(
                    player_id,
                    team_id,
                    descriptor.host.clone(),
                    descriptor.path.clone(),
                ),
            );
        }

        Ok(Self { items, next_id })
    }

    /// The id the next player without an explicit id would receive
    pub fn next_id(&self) -> Identifier {
        self.next_id
    }

    /// Team id of every player, in player order
    pub fn team_ids(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.items.iter().map(|(_, player)| player.team_id())
    }
}

impl Deref for Players {
    type Target = States<Player>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl DerefMut for Players {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn descriptor(player_id: Option<Identifier>) -> PlayerConfig {
        PlayerConfig {
            player_id,
            ..PlayerConfig::default()
        }
    }

    #[test]
    fn missing_ids_are_numbered_from_zero() {
        let players =
            Players::new(&[descriptor(None), descriptor(None), descriptor(None)]).unwrap();

        assert_eq!(players.ids().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(players.next_id(), 3);
    }

    #[test]
    fn duplicate_id_is_bumped_to_next_free() {
        let players =
            Players::new(&[descriptor(Some(2)), descriptor(Some(2)), descriptor(None)]).unwrap();

        // 2 is taken first, the duplicate moves to 3, the id-less one follows on
        assert_eq!(players.ids().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(players.next_id(), 5);
    }

    #[test]
    fn low_declared_id_does_not_lower_next_id() {
        let players =
            Players::new(&[descriptor(Some(5)), descriptor(Some(1)), descriptor(None)]).unwrap();

        assert_eq!(players.ids().collect::<Vec<_>>(), vec![5, 1, 6]);
        assert_eq!(players.next_id(), 7);
    }

    #[test]
    fn declared_id_can_claim_a_gap_later() {
        let players =
            Players::new(&[descriptor(None), descriptor(Some(0)), descriptor(Some(1))]).unwrap();

        // The second player collides with 0 and takes 1, so the third collides too
        assert_eq!(players.ids().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn order_changes_assignment() {
        let forward = Players::new(&[descriptor(Some(1)), descriptor(None)]).unwrap();
        let reverse = Players::new(&[descriptor(None), descriptor(Some(1))]).unwrap();

        assert_eq!(forward.ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(reverse.ids().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn keeps_team_and_endpoint() {
        let players = Players::new(&[PlayerConfig {
            player_id: Some(4),
            team_id: Some(2),
            host: "http://localhost:8003".to_string(),
            path: "/api/v1/player/update".to_string(),
        }])
        .unwrap();

        let player = players.get(4).unwrap();
        assert_eq!(player.player_id(), 4);
        assert_eq!(player.team_id(), 2);
        assert_eq!(
            player.endpoint().url(),
            "http://localhost:8003/api/v1/player/update"
        );
        assert_eq!(player.json(), serde_json::json!({}));
    }

    #[test]
    fn highest_id_is_rejected() {
        let err = Players::new(&[
            descriptor(None),
            descriptor(Some(Identifier::MAX)),
            descriptor(None),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::PlayerIdOutOfRange(Identifier::MAX)));

        // One below still leaves room for the next id
        let players = Players::new(&[descriptor(Some(Identifier::MAX - 1))]).unwrap();
        assert_eq!(players.next_id(), Identifier::MAX);
    }

    #[test]
    fn team_defaults_to_zero() {
        let players = Players::new(&[descriptor(Some(3))]).unwrap();
        assert_eq!(players.team_ids().collect::<Vec<_>>(), vec![0]);
    }

    /// Straight restatement of the allocation rule, used as an oracle
    fn expected_ids(declared: &[Option<Identifier>]) -> Vec<Identifier> {
        let mut taken = BTreeSet::new();
        let mut next_id = 0;
        let mut ids = Vec::new();
        for id in declared {
            let mut id = id.unwrap_or(next_id);
            if taken.contains(&id) {
                id = next_id;
            }
            next_id = next_id.max(id + 1);
            taken.insert(id);
            ids.push(id);
        }
        ids
    }

    proptest! {
        #[test]
        fn every_descriptor_gets_a_distinct_id(
            declared in prop::collection::vec(prop::option::of(0u64..8), 0..24)
        ) {
            let descriptors: Vec<_> = declared.iter().copied().map(descriptor).collect();
            let players = Players::new(&descriptors).unwrap();

            let ids: Vec<_> = players.ids().collect();
            let distinct: BTreeSet<_> = ids.iter().copied().collect();

            prop_assert_eq!(ids.len(), declared.len());
            prop_assert_eq!(distinct.len(), declared.len());
            prop_assert_eq!(ids, expected_ids(&declared));
            prop_assert!(players.ids().all(|id| id < players.next_id()));
        }
    }
}
