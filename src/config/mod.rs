//! Configuration module - JSON config files and environment

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::state::Identifier;

/// Which process this invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Orchestrator,
    Service(ServiceKind),
}

/// The peripheral services the orchestrator talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    World,
    Visualise,
    Player,
}

impl Role {
    /// Config file read when none is given on the command line
    pub fn default_config_file(&self) -> &'static str {
        match self {
            Role::Orchestrator => "orchestrator.json",
            Role::Service(ServiceKind::World) => "world.json",
            Role::Service(ServiceKind::Visualise) => "visualise.json",
            Role::Service(ServiceKind::Player) => "player.json",
        }
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "orchestrator" => Ok(Role::Orchestrator),
            "world" => Ok(Role::Service(ServiceKind::World)),
            "visualise" | "visualize" => Ok(Role::Service(ServiceKind::Visualise)),
            "player" => Ok(Role::Service(ServiceKind::Player)),
            other => Err(ConfigError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::World => write!(f, "world"),
            ServiceKind::Visualise => write!(f, "visualise"),
            ServiceKind::Player => write!(f, "player"),
        }
    }
}

/// Host and path of a remote service
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EndpointConfig {
    /// Base URL including scheme, e.g. `http://localhost:8001`
    #[serde(default)]
    pub host: String,
    /// Update path on that host
    #[serde(default)]
    pub path: String,
}

/// One entry of the orchestrator's `players` list
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub player_id: Option<Identifier>,
    #[serde(default)]
    pub team_id: Option<Identifier>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub path: String,
}

/// Where a `team` key in a player reply is stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamReplyPolicy {
    /// Store it in the Actions collection under the team id (legacy behaviour)
    #[default]
    Actions,
    /// Store it in the Teams collection under the team id
    Teams,
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrchestratorConfig {
    /// Seconds between tick starts
    #[serde(default = "default_timestep")]
    pub timestep: f64,
    #[serde(default)]
    pub world: EndpointConfig,
    #[serde(default)]
    pub visualise: EndpointConfig,
    #[serde(default)]
    pub players: Vec<PlayerConfig>,

    /// Contact all players of a tick concurrently
    #[serde(default)]
    pub parallel_players: bool,
    #[serde(default)]
    pub team_reply: TeamReplyPolicy,
    /// Stop after this many ticks instead of running until shutdown
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

fn default_timestep() -> f64 {
    1.0
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            timestep: default_timestep(),
            world: EndpointConfig::default(),
            visualise: EndpointConfig::default(),
            players: Vec::new(),
            parallel_players: false,
            team_reply: TeamReplyPolicy::default(),
            max_ticks: None,
        }
    }
}

impl OrchestratorConfig {
    /// Load and validate an orchestrator config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.tick_duration()?;
        // The id after a declared one must still be representable
        if let Some(player_id) = self
            .players
            .iter()
            .filter_map(|player| player.player_id)
            .find(|&player_id| player_id == Identifier::MAX)
        {
            return Err(ConfigError::PlayerIdOutOfRange(player_id));
        }
        Ok(())
    }

    /// Timestep as a duration
    pub fn tick_duration(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.timestep)
            .map_err(|_| ConfigError::InvalidTimestep(self.timestep))
    }
}

/// Configuration shared by the World, Visualise and Player services
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Player display name
    #[serde(default = "default_name")]
    pub name: String,
    /// Player team name
    #[serde(default = "default_team")]
    pub team: String,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_name() -> String {
    "anonymous".to_string()
}

fn default_team() -> String {
    "individual".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            name: default_name(),
            team: default_team(),
            seed: None,
        }
    }
}

impl ServiceConfig {
    /// Load a service config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_json(path.as_ref())
    }
}

/// Log level from `LOG_LEVEL` (trace, debug, info, warn, error)
pub fn log_level_from_env() -> String {
    env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid timestep {0}: must be a finite, non-negative number of seconds")]
    InvalidTimestep(f64),

    #[error("Player id {0} is out of range")]
    PlayerIdOutOfRange(Identifier),

    #[error("Missing role argument (orchestrator, world, visualise or player)")]
    MissingRole,

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}
