//! HTTP surface of the services

pub mod routes;

pub use routes::build_router;
