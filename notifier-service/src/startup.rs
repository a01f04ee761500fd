//! Application startup and lifecycle management.

use crate::config::NotifierConfig;
use crate::handlers;
use crate::services::{DataStore, MockPushProvider, OneSignalProvider, PostgrestStore, PushProvider};
use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: NotifierConfig,
    pub store: Arc<dyn DataStore>,
    pub push_provider: Arc<dyn PushProvider>,
}

/// Build the HTTP router for the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/send_announcement", post(handlers::send_announcement))
        .route("/trigger_stock_alert", post(handlers::trigger_stock_alert))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Outbound client shared by the data store and the push provider.
pub fn http_client(config: &NotifierConfig) -> Result<Client, AppError> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.http.timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: NotifierConfig) -> Result<Self, AppError> {
        let client = http_client(&config)?;

        let store: Arc<dyn DataStore> = Arc::new(PostgrestStore::new(&config.supabase, client.clone()));

        let push_provider: Arc<dyn PushProvider> = if config.onesignal.enabled {
            tracing::info!("OneSignal push provider initialized");
            Arc::new(OneSignalProvider::new(config.onesignal.clone(), client))
        } else {
            tracing::warn!("OneSignal provider disabled, push notifications will not be delivered");
            Arc::new(MockPushProvider::new(true).dry_run())
        };

        let state = AppState {
            config: config.clone(),
            store,
            push_provider,
        };

        Self::with_state(state).await
    }

    /// Bind the HTTP listener for an already assembled state.
    pub async fn with_state(state: AppState) -> Result<Self, AppError> {
        // port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Notifier service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router: router(state),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await.map_err(|e| {
            tracing::error!("HTTP server error: {}", e);
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
