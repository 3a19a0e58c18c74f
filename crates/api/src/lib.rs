//! NUHire API server library.
//!
//! Exposes config, state, error handling, routes, the group workflow and
//! the WebSocket layer so integration tests and the binary share them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod realtime;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod workflow;
pub mod ws;
