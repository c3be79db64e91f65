//! HazardNexus service
//!
//! Wires the collectors, the snapshot store and the risk classifier into a
//! periodic collection loop and a read-only HTTP API.

pub mod cli;
pub mod config;
pub mod cycle;
pub mod server;
pub mod state;

pub use config::ServiceConfig;
pub use server::{build_app, run_server};
pub use state::AppState;
