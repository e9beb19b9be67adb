//! heartbeat: a status card for a backend health endpoint.
//!
//! A background [`poller::StatusPoller`] checks `GET <api-url>/api/health`
//! on a fixed interval; the axum router built by [`routes::create_router`]
//! renders the latest result as an HTML card and as JSON.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod poller;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::*;
