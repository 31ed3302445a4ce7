//! Visualise service: draws the board with every player on it

use serde_json::Value;
use tracing::{debug, info};

use crate::protocol::{RenderReply, VisualiseRender, VISUALISE_RENDER_PATH};

use super::grid::WorldGrid;
use super::{encode_reply, Service, ServiceError};

#[derive(Debug, Default)]
pub struct VisualiseService;

impl VisualiseService {
    pub fn new() -> Self {
        Self
    }

    /// Board with an `A` at each player position
    pub fn render(&self, render: &VisualiseRender) -> String {
        render.world.render(
            render
                .players
                .values()
                .map(|player| (player.x, player.y, WorldGrid::PLAYER)),
        )
    }
}

impl Service for VisualiseService {
    fn title(&self) -> &'static str {
        "Visualise"
    }

    fn update_path(&self) -> &'static str {
        VISUALISE_RENDER_PATH
    }

    fn receive(&self, request: Value) -> Result<Value, ServiceError> {
        let render: VisualiseRender =
            serde_json::from_value(request).map_err(ServiceError::InvalidRequest)?;

        let board = self.render(&render);
        debug!(teams = render.teams.len(), "Teams received");
        info!(
            time = render.time,
            players = render.players.len(),
            "Frame\n{}",
            board
        );

        encode_reply(&RenderReply {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draws_players_over_board() {
        let mut world = WorldGrid::blank(4, 2);
        world.set_cell(3, 1, WorldGrid::FOOD);

        let render: VisualiseRender = serde_json::from_value(json!({
            "time": 7,
            "world": world,
            "teams": {"0": {}},
            "players": {"0": {"x": 1, "y": 0}, "4": {"x": 2, "y": 1}}
        }))
        .unwrap();

        assert_eq!(VisualiseService::new().render(&render), ".A..\n..A*");
    }

    #[test]
    fn replies_with_empty_object() {
        let reply = VisualiseService::new()
            .receive(json!({"time": 0, "world": {}, "teams": {}, "players": {}}))
            .unwrap();
        assert_eq!(reply, json!({}));
    }
}
