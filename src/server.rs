//! Gateway server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::api::{AppState, create_router};
use crate::auth::{BearerAuth, KeyStore, TokenVerifier};
use crate::config::Config;
use crate::provider::{ClientUuidCache, ProviderClient};
use crate::{Error, Result};

/// IdP gateway server
pub struct Server {
    config: Config,
    state: Arc<AppState>,
    bearer: Arc<BearerAuth>,
}

impl Server {
    /// Wire the key store, verifier, provider client and services.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let http = ProviderClient::http_client(&config.provider)?;
        let keys = Arc::new(KeyStore::new(http.clone(), config.provider.jwks_url()));
        let verifier = Arc::new(TokenVerifier::from_config(&config.provider, keys)?);
        let provider = Arc::new(ProviderClient::new(
            &config.provider,
            http,
            Arc::new(ClientUuidCache::new()),
        ));

        let state = Arc::new(AppState::new(provider, Arc::clone(&verifier)));
        let bearer = Arc::new(BearerAuth::new(verifier, config.auth.verify_tokens));

        Ok(Self {
            config,
            state,
            bearer,
        })
    }

    /// The fully layered router
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.state), Arc::clone(&self.bearer))
    }

    /// Run the gateway until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let app = self.router();
        let listener = TcpListener::bind(addr).await?;

        let provider = &self.config.provider;
        info!("============================================================");
        info!("IDP GATEWAY v{}", env!("CARGO_PKG_VERSION"));
        info!("============================================================");
        info!(host = %self.config.server.host, port = %self.config.server.port, "Listening");
        info!(realm = %provider.realm, client_id = %provider.client_id, "Identity provider");
        info!("  Admin API: {}", provider.admin_url());
        info!("  Key set:   {}", provider.jwks_url());
        info!("  Issuer:    {}", provider.issuer());
        if self.config.auth.verify_tokens {
            info!(algorithm = %provider.algorithm, "TOKEN VERIFICATION enabled");
        } else {
            warn!("TOKEN VERIFICATION disabled - bearer tokens are forwarded unchecked");
        }
        info!("============================================================");

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown_tx))
            .into_future();

        tokio::select! {
            result = serve => result.map_err(|e| Error::Internal(e.to_string()))?,
            () = drain_deadline(shutdown_rx, self.config.server.shutdown_timeout) => {
                warn!(
                    timeout = ?self.config.server.shutdown_timeout,
                    "Graceful shutdown timed out, dropping in-flight requests"
                );
            }
        }

        info!("Gateway stopped");
        Ok(())
    }
}

/// Completes `timeout` after the shutdown signal fired.
async fn drain_deadline(mut shutdown_rx: broadcast::Receiver<()>, timeout: Duration) {
    if shutdown_rx.recv().await.is_err() {
        // Sender dropped without a signal: the server already finished
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(timeout).await;
}

/// Shutdown signal handler
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
