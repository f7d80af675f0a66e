//! HTTP surface over the command gateway.
//!
//! Each route is a thin adapter: path in, one gateway call, JSON envelope out.

pub mod envelope;
pub mod routes;
pub mod server;

pub use server::{build_router, start_server, AppState};
