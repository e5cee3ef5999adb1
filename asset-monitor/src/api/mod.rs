//! Read-only HTTP API over the monitor's status and alert log.

mod server;
mod v0;

pub use server::{SharedState, build_router, serve};
