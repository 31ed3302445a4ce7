//! World service: grows food and applies player actions

use std::collections::BTreeMap;

use parking_lot::Mutex;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use tracing::debug;

use crate::protocol::{ActionState, WorldReply, WorldUpdate, WORLD_UPDATE_PATH};
use crate::state::Identifier;

use super::grid::WorldGrid;
use super::{encode_reply, Service, ServiceError};

/// One in this many ticks grows a piece of food
pub const GROW_CHANCE: u32 = 5;

pub struct WorldService {
    rng: Mutex<ChaCha8Rng>,
}

impl WorldService {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Advance the world by one tick
    pub fn update(&self, world: &mut WorldGrid, actions: &BTreeMap<Identifier, ActionState>) {
        let mut rng = self.rng.lock();
        if let Some((x, y)) = grow(world, &mut *rng) {
            debug!(x, y, "Food grew");
        }
        for action in actions.values() {
            act(world, action);
        }
    }
}

/// With probability 1 in [`GROW_CHANCE`], place food on a random cell
pub fn grow<R: Rng + ?Sized>(world: &mut WorldGrid, rng: &mut R) -> Option<(usize, usize)> {
    if world.is_empty() || rng.gen_range(0..GROW_CHANCE) != 0 {
        return None;
    }
    let x = rng.gen_range(0..world.width);
    let y = rng.gen_range(0..world.height);
    world.set_cell(x as i64, y as i64, WorldGrid::FOOD);
    Some((x, y))
}

/// Apply a single player action to the board
pub fn act(world: &mut WorldGrid, action: &ActionState) {
    if action.action == ActionState::EAT {
        world.set_cell(action.x, action.y, WorldGrid::EMPTY);
    }
}

impl Service for WorldService {
    fn title(&self) -> &'static str {
        "World"
    }

    fn update_path(&self) -> &'static str {
        WORLD_UPDATE_PATH
    }

    fn receive(&self, request: Value) -> Result<Value, ServiceError> {
        let WorldUpdate {
            time,
            world,
            actions,
        } = serde_json::from_value(request).map_err(ServiceError::InvalidRequest)?;
        let mut world = world.or_default_board();

        self.update(&mut world, &actions);

        let board = world.render(
            actions
                .values()
                .map(|action| (action.x, action.y, WorldGrid::PLAYER)),
        );
        debug!(time, actions = actions.len(), "World\n{}", board);

        encode_reply(&WorldReply { world })
    }
}
