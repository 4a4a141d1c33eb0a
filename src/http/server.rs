//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all forwarding handlers
//! - Wire up middleware (tracing, body limit, request ID, optional timeout)
//! - Bind server to listener
//! - Stop accepting on shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::forward::{Forwarder, SetupError};
use crate::http::handlers::{self, delete_route, download_route};
use crate::http::request::{propagate_request_id_layer, request_id_of, set_request_id_layer};
use crate::routing::Resource;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, SetupError> {
        let forwarder = Forwarder::new(&config.upstream)?;
        tracing::info!(upstream = %forwarder.base_url(), "Upstream configured");

        let state = AppState {
            forwarder: Arc::new(forwarder),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/compress", post(handlers::compress_pdf))
            .route(
                "/api/download",
                download_route(Resource::Pdf).merge(delete_route(Resource::Pdf)),
            )
            .route("/api/image/compress", post(handlers::compress_image))
            .route("/api/image/download", download_route(Resource::Image))
            .route("/api/image/delete", delete_route(Resource::Image))
            .route(
                "/api/video",
                post(handlers::compress_video)
                    .merge(download_route(Resource::Video))
                    .merge(delete_route(Resource::Video)),
            )
            .route("/api/convert/word-to-pdf", post(handlers::word_to_pdf))
            .route("/api/convert/pdf-to-word", post(handlers::pdf_to_word))
            .route(
                "/api/convert/download",
                download_route(Resource::Document).merge(delete_route(Resource::Document)),
            )
            .route(
                "/api/watermark",
                post(handlers::remove_watermark)
                    .merge(download_route(Resource::Watermark))
                    .merge(delete_route(Resource::Watermark)),
            )
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size));

        let router = match config.timeouts.request_secs {
            Some(secs) => router.layer(TimeoutLayer::new(Duration::from_secs(secs))),
            None => router,
        };

        router
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id_of(request),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
