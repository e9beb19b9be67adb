//! HTTP server startup logic.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;

use crate::config::HttpServerConfig;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid http.host or http.port: {0}")]
    Address(String),

    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),
}

/// Serve `app` until `shutdown` resolves, then drain open connections.
///
/// This function blocks until the server shuts down.
pub async fn start_server<F>(
    app: Router,
    config: &HttpServerConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Address(format!("{}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_server_rejects_bad_address() {
        let config = HttpServerConfig {
            host: "not an address".to_string(),
            port: 3000,
        };
        let err = start_server(Router::new(), &config, async {})
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Address(_)));
    }

    #[tokio::test]
    async fn test_start_server_returns_on_shutdown() {
        let config = HttpServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        start_server(Router::new(), &config, async {}).await.unwrap();
    }
}
