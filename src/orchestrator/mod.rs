//! Orchestrator: owns the synchronised state and runs the tick loop

pub mod engine;
pub mod players;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{Orchestrator, OrchestratorError, Peer, TickPhase};
pub use players::{Player, Players};
pub use transport::{ExchangeError, HttpTransport, Transport};
