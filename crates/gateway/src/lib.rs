//! Gateway: HTTP server exposing channel resolution and presence.
//!
//! Lifecycle:
//! 1. Open the SQLite database and create tables
//! 2. Register the built-in business modules
//! 3. Wire resolver, presence aggregator and token store into shared state
//! 4. Serve `/health` and the authenticated `/v1` channel routes
//!
//! Channel semantics live in `parley-channels`; this crate only adapts them
//! to HTTP and provides the SQLite-backed collaborators.

pub mod auth;
pub mod auth_middleware;
pub mod channel_routes;
pub mod channel_setting_store;
pub mod directory_store;
pub mod modules;
pub mod server;
pub mod state;
