//! Player service: wanders the board and eats what it finds

use parking_lot::Mutex;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use tracing::debug;

use crate::protocol::{ActionState, PlayerPosition, PlayerReply, PlayerUpdate, PLAYER_UPDATE_PATH};

use super::grid::WorldGrid;
use super::{encode_reply, Service, ServiceError};

/// A single step on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Move one cell, wrapping around the board. An empty board pins the player.
    pub fn step(self, position: PlayerPosition, world: &WorldGrid) -> PlayerPosition {
        let Some((x, y)) = world.wrap(position.x, position.y) else {
            return position;
        };
        let (dx, dy) = match self {
            Direction::Up => (0, 1),
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
        };
        PlayerPosition {
            x: (x as i64 + dx).rem_euclid(world.width as i64),
            y: (y as i64 + dy).rem_euclid(world.height as i64),
        }
    }
}

/// Pick the action for a player standing on a cell
pub fn choose_action(position: PlayerPosition, world: &WorldGrid) -> ActionState {
    let verb = match world.get_cell(position.x, position.y) {
        Some(WorldGrid::FOOD) => ActionState::EAT,
        _ => ActionState::MOVE,
    };
    ActionState::new(position.x, position.y, verb)
}

pub struct PlayerService {
    name: String,
    team: String,
    rng: Mutex<ChaCha8Rng>,
}

impl PlayerService {
    pub fn new(name: impl Into<String>, team: impl Into<String>, rng: ChaCha8Rng) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            rng: Mutex::new(rng),
        }
    }

    /// Random walk one step, then decide what to do there
    pub fn update(&self, player: PlayerPosition, world: &WorldGrid) -> PlayerReply {
        let direction = Direction::random(&mut *self.rng.lock());
        let player = direction.step(player, world);
        let action = choose_action(player, world);
        PlayerReply { player, action }
    }
}

impl Service for PlayerService {
    fn title(&self) -> &'static str {
        "Player"
    }

    fn update_path(&self) -> &'static str {
        PLAYER_UPDATE_PATH
    }

    fn receive(&self, request: Value) -> Result<Value, ServiceError> {
        let PlayerUpdate {
            time, world, player, ..
        } = serde_json::from_value(request).map_err(ServiceError::InvalidRequest)?;

        let reply = self.update(player, &world);

        let board = world.render([(reply.player.x, reply.player.y, WorldGrid::PLAYER)]);
        debug!(
            time,
            name = %self.name,
            team = %self.team,
            action = %reply.action.action,
            "Player\n{}",
            board
        );

        encode_reply(&reply)
    }
}
