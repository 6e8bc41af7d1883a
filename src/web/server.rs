//! Web server for subfeed.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::{Result, SubfeedError};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    cors_origins: Vec<String>,
}

impl WebServer {
    pub fn new(config: &ServerConfig, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| {
                SubfeedError::Config(format!(
                    "invalid server address {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins: config.cors_origins.clone(),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router =
            create_router(self.app_state, &self.cors_origins).merge(create_health_router());

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Web server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleClock;
    use crate::youtube::ReqwestHttpClient;
    use crate::Database;
    use std::time::Duration;

    async fn state() -> AppState {
        let db = Database::open_in_memory().await.unwrap();
        let client = Arc::new(ReqwestHttpClient::new(&Default::default()).unwrap());
        let clock = ScheduleClock::new("UTC", &[0]).unwrap();
        AppState::new(db, client, clock, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_new_parses_address() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        };
        let server = WebServer::new(&config, state().await).unwrap();
        assert_eq!(server.addr().to_string(), "127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_new_rejects_bad_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        };
        assert!(matches!(
            WebServer::new(&config, state().await),
            Err(SubfeedError::Config(_))
        ));
    }
}
