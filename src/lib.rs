//! Library crate for battle-arena-back, exposing modules for binaries and integration tests.

/// Runtime configuration and remote backend parameters.
pub mod config;
/// Persistence layer: models, backends and the storage selector.
pub mod dao;
/// Request and response payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP route trees.
pub mod routes;
/// Business logic invoked by the routes.
pub mod services;
/// Shared application state.
pub mod state;
