//! HTTP interface for the STORIUM file registry.
//!
//! Maps the engine's request/response operations onto an axum router. The
//! caller identity arrives pre-verified in the [`server::IDENTITY_HEADER`]
//! header; this crate parses it and nothing more. Authentication happens
//! upstream.

pub mod access;
pub mod events;
pub mod files;
pub mod server;

pub use server::{build_router, start_server, ApiError, AppState, SharedState, IDENTITY_HEADER};
