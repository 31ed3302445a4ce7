//! Wire types for orchestrator-service exchanges
//!
//! Every exchange is one JSON object POSTed to a service's update path and one
//! JSON object sent back. The orchestrator side treats payloads as opaque
//! values; the service side reads them into the small typed structs below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sim::grid::WorldGrid;
use crate::state::Identifier;

pub const WORLD_UPDATE_PATH: &str = "/api/v1/world/update";
pub const VISUALISE_RENDER_PATH: &str = "/api/v1/visualise/render";
pub const PLAYER_UPDATE_PATH: &str = "/api/v1/player/update";

/// Recognised top-level reply keys
pub const WORLD_KEY: &str = "world";
pub const PLAYER_KEY: &str = "player";
pub const ACTION_KEY: &str = "action";
pub const TEAM_KEY: &str = "team";

// ============================================================================
// Orchestrator -> service
// ============================================================================

/// Sent to the World service
#[derive(Debug, Clone, Serialize)]
pub struct WorldRequest<'a> {
    pub time: u64,
    pub world: &'a Value,
    pub actions: Value,
}

/// Sent to the Visualise service
#[derive(Debug, Clone, Serialize)]
pub struct VisualiseRequest<'a> {
    pub time: u64,
    pub world: &'a Value,
    pub teams: Value,
    pub players: Value,
}

/// Sent to each Player service
#[derive(Debug, Clone, Serialize)]
pub struct PlayerRequest<'a> {
    pub time: u64,
    pub world: &'a Value,
    pub team: Value,
    pub player: Value,
}

// ============================================================================
// Service -> orchestrator
// ============================================================================

/// A reply body
///
/// Recognised keys are optional. A key that is present, even with a null
/// value, is an update; a missing key means "no update this tick". Unknown
/// keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Reply(Map<String, Value>);

impl Reply {
    /// Parse a reply body; anything but a JSON object is malformed
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Remove and return the value under `key`
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }
}

// ============================================================================
// Service-side payloads
// ============================================================================

/// A player's position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPosition {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
}

/// What a player did at a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    #[serde(default = "default_verb")]
    pub action: String,
}

fn default_verb() -> String {
    ActionState::NONE.to_string()
}

impl ActionState {
    pub const NONE: &'static str = "none";
    pub const MOVE: &'static str = "move";
    pub const EAT: &'static str = "eat";

    pub fn new(x: i64, y: i64, action: impl Into<String>) -> Self {
        Self {
            x,
            y,
            action: action.into(),
        }
    }
}

impl Default for ActionState {
    fn default() -> Self {
        Self::new(0, 0, Self::NONE)
    }
}

/// Body received by the World service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldUpdate {
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub world: WorldGrid,
    #[serde(default)]
    pub actions: BTreeMap<Identifier, ActionState>,
}

/// Body received by the Visualise service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisualiseRender {
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub world: WorldGrid,
    #[serde(default)]
    pub teams: BTreeMap<Identifier, Value>,
    #[serde(default)]
    pub players: BTreeMap<Identifier, PlayerPosition>,
}

/// Body received by a Player service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerUpdate {
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub world: WorldGrid,
    #[serde(default)]
    pub team: Value,
    #[serde(default)]
    pub player: PlayerPosition,
}

/// World service reply
#[derive(Debug, Clone, Serialize)]
pub struct WorldReply {
    pub world: WorldGrid,
}

/// Player service reply
#[derive(Debug, Clone, Serialize)]
pub struct PlayerReply {
    pub player: PlayerPosition,
    pub action: ActionState,
}

/// Visualise service reply, carries nothing
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderReply {}
