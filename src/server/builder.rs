//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::router::build_cat_routes;
use crate::config::AppConfig;
use crate::core::auth::{AuthProvider, HeaderAuthProvider, PolicyEngine};
use crate::core::store::CatStore;
use crate::core::{CatCatalog, CatSearchService};
use crate::storage::InMemoryCatStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the adoption HTTP server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_config(AppConfig::from_yaml_file("pawprint.yaml")?)
///     .with_store(InMemoryCatStore::new())
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn CatStore>>,
    config: AppConfig,
    policy: Option<PolicyEngine>,
    auth: Arc<dyn AuthProvider>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            config: AppConfig::default(),
            policy: None,
            auth: Arc::new(HeaderAuthProvider),
            custom_routes: Vec::new(),
        }
    }

    /// Set the cat store. Defaults to an empty in-memory store.
    pub fn with_store(mut self, store: impl CatStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a store that is also held elsewhere
    pub fn with_shared_store(mut self, store: Arc<dyn CatStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the policy derived from configuration
    pub fn with_policy(mut self, policy: PolicyEngine) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Arc::new(provider);
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints outside the catalogue, such as session
    /// callbacks or donation webhooks.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Assemble the state shared by every handler
    pub fn build_state(&mut self) -> Result<AppState> {
        let store = self
            .store
            .clone()
            .unwrap_or_else(|| Arc::new(InMemoryCatStore::new()));
        let policy = match self.policy.take() {
            Some(policy) => policy,
            None => PolicyEngine::from_overrides(&self.config.policies)?,
        };

        let search = CatSearchService::new(store.clone())
            .with_stale_cursor_policy(self.config.search.stale_cursor);
        let catalog = CatCatalog::new(store, Arc::new(policy));

        Ok(AppState {
            search,
            catalog,
            auth: self.auth.clone(),
        })
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;

        let mut app = build_cat_routes(state);
        for routes in self.custom_routes {
            app = app.merge(routes);
        }

        let app = app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
        if self.config.server.permissive_cors {
            Ok(app.layer(CorsLayer::permissive()))
        } else {
            Ok(app)
        }
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.bind_addr.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
