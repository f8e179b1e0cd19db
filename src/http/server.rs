//! API server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with every REST route
//! - Wire up middleware (tracing, CORS, limits, request ID, metrics)
//! - Inject the store into handlers through `AppState`
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ApiConfig, ForumConfig};
use crate::http::handlers::{courses, health, questions};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::timeout_envelope;
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;
use crate::store::ForumStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ForumStore>,
    pub api: Arc<ApiConfig>,
}

/// HTTP server for the forum REST API.
pub struct ApiServer {
    router: Router,
    config: ForumConfig,
}

impl ApiServer {
    /// Create a server around an already-constructed store.
    pub fn new(config: ForumConfig, store: Arc<dyn ForumStore>) -> Self {
        let state = AppState {
            store,
            api: Arc::new(config.api.clone()),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ForumConfig, state: AppState) -> Router {
        let api = Router::new()
            .route("/api/health", get(health::health))
            .route("/api/ready", get(health::ready))
            .route(
                "/api/courses",
                get(courses::list_courses).post(courses::create_course),
            )
            .route(
                "/api/courses/{id}",
                get(courses::get_course).delete(courses::delete_course),
            )
            .route(
                "/api/courses/{id}/questions",
                get(questions::list_questions).post(questions::create_question),
            )
            .route(
                "/api/courses/{id}/questions/{q_id}",
                axum::routing::delete(questions::delete_question),
            )
            .route(
                "/api/courses/{id}/questions/{q_id}/upvote",
                post(questions::upvote_question),
            )
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::map_response(timeout_envelope))
            .layer(middleware::from_fn_with_state("api", metrics::track_requests))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer());

        if config.security.cors_enabled {
            api.layer(CorsLayer::permissive())
        } else {
            api
        }
    }

    /// The router, for in-process testing with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.api.service_name,
            "API server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ForumConfig {
        &self.config
    }
}
