//! Orchestrator state and the per-tick exchange loop

use std::fmt;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::{ConfigError, OrchestratorConfig, TeamReplyPolicy};
use crate::protocol::{
    PlayerRequest, Reply, VisualiseRequest, WorldRequest, ACTION_KEY, PLAYER_KEY, TEAM_KEY,
    WORLD_KEY,
};
use crate::state::{Action, Entity, HostReference, Identifier, States, Team};
use crate::util::time::time_remaining;

use super::players::{Player, Players};
use super::transport::{ExchangeError, Transport};

/// Where the orchestrator is within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Idle,
    AwaitingWorld,
    AwaitingVisualise,
    AwaitingPlayers,
    TickComplete,
}

/// The peer an exchange was with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peer {
    World,
    Visualise,
    Player(Identifier),
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::World => write!(f, "world"),
            Peer::Visualise => write!(f, "visualise"),
            Peer::Player(id) => write!(f, "player {}", id),
        }
    }
}

/// Faults that end a tick
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Exchange with {peer} failed: {source}")]
    Exchange { peer: Peer, source: ExchangeError },

    #[error("Malformed reply from {peer}: {source}")]
    MalformedReply {
        peer: Peer,
        source: serde_json::Error,
    },

    #[error("Failed to encode request for {peer}: {source}")]
    Encode {
        peer: Peer,
        source: serde_json::Error,
    },
}

/// A request ready to go to one player
struct PlayerExchange {
    player_id: Identifier,
    team_id: Identifier,
    url: String,
    body: Vec<u8>,
}

/// Owns all synchronised state and drives the tick loop
pub struct Orchestrator<T> {
    transport: T,
    time: u64,
    timestep: Duration,
    phase: TickPhase,
    world: HostReference,
    visualise: HostReference,
    players: Players,
    actions: States<Action>,
    teams: States<Team>,
    team_reply: TeamReplyPolicy,
    parallel_players: bool,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(config: &OrchestratorConfig, transport: T) -> Result<Self, ConfigError> {
        let timestep = config.tick_duration()?;
        let players = Players::new(&config.players)?;
        let actions = States::from_identifiers(players.ids());
        let teams = States::from_identifiers(players.team_ids());

        let world = HostReference::new(config.world.host.clone(), config.world.path.clone());
        let visualise =
            HostReference::new(config.visualise.host.clone(), config.visualise.path.clone());

        info!(
            world = %world.url(),
            visualise = %visualise.url(),
            players = players.len(),
            teams = teams.len(),
            "Orchestrator configured"
        );

        Ok(Self {
            transport,
            time: 0,
            timestep,
            phase: TickPhase::Idle,
            world,
            visualise,
            players,
            actions,
            teams,
            team_reply: config.team_reply,
            parallel_players: config.parallel_players,
        })
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn phase(&self) -> TickPhase {
        self.phase
    }

    pub fn world(&self) -> &HostReference {
        &self.world
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn actions(&self) -> &States<Action> {
        &self.actions
    }

    pub fn teams(&self) -> &States<Team> {
        &self.teams
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run ticks back to back, one every `timestep`
    ///
    /// A tick that overruns is followed by the next one straight away; ticks
    /// are never skipped. Stops after `max_ticks` ticks if given, otherwise
    /// only on error.
    pub async fn run(&mut self, max_ticks: Option<u64>) -> Result<(), OrchestratorError> {
        loop {
            if max_ticks.is_some_and(|max| self.time >= max) {
                info!(time = self.time, "Tick limit reached");
                return Ok(());
            }

            let tick_start = Instant::now();
            self.poll().await?;

            if let Some(remaining) = time_remaining(tick_start, self.timestep) {
                sleep(remaining).await;
            }
        }
    }

    /// One full tick: World, then Visualise, then every Player
    pub async fn poll(&mut self) -> Result<(), OrchestratorError> {
        info!(time = self.time, "Poll");

        self.phase = TickPhase::AwaitingWorld;
        self.send_to_world().await?;

        self.phase = TickPhase::AwaitingVisualise;
        self.send_to_visualise().await?;

        self.phase = TickPhase::AwaitingPlayers;
        if self.parallel_players {
            self.send_to_players_concurrently().await?;
        } else {
            self.send_to_players().await?;
        }

        self.time += 1;
        self.phase = TickPhase::TickComplete;
        Ok(())
    }

    async fn send_to_world(&mut self) -> Result<(), OrchestratorError> {
        let world = self.world.json();
        let body = encode(
            Peer::World,
            &WorldRequest {
                time: self.time,
                world: &world,
                actions: self.actions.json(),
            },
        )?;

        let mut reply = self.exchange(Peer::World, &self.world.url(), body).await?;
        if let Some(world) = reply.take(WORLD_KEY) {
            self.world.set_state(world);
        }
        Ok(())
    }

    async fn send_to_visualise(&mut self) -> Result<(), OrchestratorError> {
        let world = self.world.json();
        let body = encode(
            Peer::Visualise,
            &VisualiseRequest {
                time: self.time,
                world: &world,
                teams: self.teams.json(),
                players: self.players.json(),
            },
        )?;

        // Rendering only, nothing comes back into our state
        self.exchange(Peer::Visualise, &self.visualise.url(), body)
            .await?;
        Ok(())
    }

    /// Players one at a time, each request built from the state left by the previous reply
    async fn send_to_players(&mut self) -> Result<(), OrchestratorError> {
        let player_ids: Vec<Identifier> = self.players.ids().collect();

        for player_id in player_ids {
            let Some(player) = self.players.get(player_id) else {
                continue;
            };
            let exchange = self.player_exchange(player_id, player)?;

            let peer = Peer::Player(player_id);
            let reply = self.exchange(peer, &exchange.url, exchange.body).await?;
            self.merge_player_reply(player_id, exchange.team_id, reply);
        }
        Ok(())
    }

    /// All player exchanges in flight at once, merged in player order afterwards
    ///
    /// Every request is built before the first one is sent, so no player sees
    /// another player's reply from the same tick.
    async fn send_to_players_concurrently(&mut self) -> Result<(), OrchestratorError> {
        let exchanges = self
            .players
            .iter()
            .map(|(player_id, player)| self.player_exchange(player_id, player))
            .collect::<Result<Vec<_>, _>>()?;

        let replies = join_all(exchanges.iter().map(|exchange| {
            let peer = Peer::Player(exchange.player_id);
            self.exchange(peer, &exchange.url, exchange.body.clone())
        }))
        .await;

        for (exchange, reply) in exchanges.iter().zip(replies) {
            self.merge_player_reply(exchange.player_id, exchange.team_id, reply?);
        }
        Ok(())
    }

    fn player_exchange(
        &self,
        player_id: Identifier,
        player: &Player,
    ) -> Result<PlayerExchange, OrchestratorError> {
        let team_id = player.team_id();
        let team = self
            .teams
            .get(team_id)
            .map(Entity::json)
            .unwrap_or_else(|| Value::Object(Map::new()));

        let world = self.world.json();
        let body = encode(
            Peer::Player(player_id),
            &PlayerRequest {
                time: self.time,
                world: &world,
                team,
                player: player.json(),
            },
        )?;

        Ok(PlayerExchange {
            player_id,
            team_id,
            url: player.endpoint().url(),
            body,
        })
    }

    fn merge_player_reply(&mut self, player_id: Identifier, team_id: Identifier, mut reply: Reply) {
        if let Some(state) = reply.take(PLAYER_KEY) {
            if let Some(player) = self.players.get_mut(player_id) {
                player.set_state(state);
            }
        }
        if let Some(state) = reply.take(ACTION_KEY) {
            self.actions.merge(player_id, state);
        }
        if let Some(state) = reply.take(TEAM_KEY) {
            match self.team_reply {
                TeamReplyPolicy::Actions => self.actions.merge(team_id, state),
                TeamReplyPolicy::Teams => self.teams.merge(team_id, state),
            }
        }
    }

    async fn exchange(&self, peer: Peer, url: &str, body: Vec<u8>) -> Result<Reply, OrchestratorError> {
        debug!(%peer, bytes = body.len(), "tx");

        let raw = self
            .transport
            .post(url, body)
            .await
            .map_err(|source| OrchestratorError::Exchange { peer, source })?;

        debug!(%peer, bytes = raw.len(), "rx");

        Reply::from_slice(&raw).map_err(|source| OrchestratorError::MalformedReply { peer, source })
    }
}

fn encode<R: Serialize>(peer: Peer, request: &R) -> Result<Vec<u8>, OrchestratorError> {
    serde_json::to_vec(request).map_err(|source| OrchestratorError::Encode { peer, source })
}
