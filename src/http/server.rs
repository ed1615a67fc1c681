//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the shared application state (limiter, forwarder, identity)
//! - Wire up middleware (request ID, tracing, metrics)
//! - Log every request and its response at INFO
//! - Bind server to listener with peer address info
//! - Run the idle-client sweeper alongside the server
//! - Stop on the shutdown signal and drain in-flight requests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::{ConfigError, GatewayConfig};
use crate::config::validation::validate_config;
use crate::http::forward::Forwarder;
use crate::http::request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing;
use crate::security::rate_limit::run_sweeper;
use crate::security::{ClientIdentity, HeaderPolicy, RateLimiter};

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub forwarder: Arc<Forwarder>,
    pub identity: ClientIdentity,
}

impl AppState {
    /// Build the state from an already validated configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let headers = HeaderPolicy::from_config(&config.headers)?;

        Ok(Self {
            limiter: Arc::new(RateLimiter::from_config(&config.rate_limit)),
            forwarder: Arc::new(Forwarder::new(&config.upstream, headers)),
            identity: ClientIdentity::new(config.rate_limit.client_identity),
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let state = AppState::from_config(&config)?;
        let router = Self::build_router(state.clone());

        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        routing::build_router(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                path = %request.uri().path(),
                                request_id = %request_id(request),
                            )
                        })
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(middleware::from_fn(metrics::track_requests)),
        )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.state.forwarder.base_url(),
            limit = self.config.rate_limit.limit,
            window = ?self.state.limiter.window(),
            identity = ?self.config.rate_limit.client_identity,
            "HTTP server starting"
        );

        tokio::spawn(run_sweeper(
            self.state.limiter.clone(),
            Duration::from_millis(self.config.rate_limit.sweep_interval_ms),
            shutdown.resubscribe(),
        ));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
