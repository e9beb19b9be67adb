//! HTTP server module.
//!
//! Serves the router on the configured address and drains connections on
//! SIGTERM/SIGINT before returning.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
pub use shutdown::shutdown_signal;
