//! Shared application state for request handlers.

use std::sync::Arc;
use tera::Tera;

use crate::config::AppConfig;
use crate::poller::StatusBoard;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the application configuration, the Tera template engine, the
/// resolved backend base URL and the board the poller publishes to.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    /// Backend base URL, resolved once at startup
    pub api_url: Arc<str>,
    pub board: StatusBoard,
}

impl AppState {
    /// Creates a new application state from the given configuration, templates and status board.
    pub fn new(config: AppConfig, tera: Tera, api_url: String, board: StatusBoard) -> Self {
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            api_url: Arc::from(api_url),
            board,
        }
    }
}
