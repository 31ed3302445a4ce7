//! DTAG - tick-based state synchronisation for a distributed turn-based game
//!
//! An orchestrator advances time in fixed steps. Each tick it pushes the
//! latest known state to a World service, a Visualise service and every
//! Player service over HTTP, and folds their replies back into its own state.
//! This crate holds the orchestrator, the state containers it is built on and
//! reference implementations of the three services.

pub mod app;
pub mod config;
pub mod http;
pub mod orchestrator;
pub mod protocol;
pub mod sim;
pub mod state;
pub mod util;
