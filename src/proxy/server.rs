//! Edge proxy server.
//!
//! # Responsibilities
//! - Accept browser requests under the configured prefix
//! - Replay method, allow-listed headers, query and body upstream
//! - Relay upstream status, headers and body back unchanged
//! - Observability (trace spans, request id, metrics)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware,
    response::Response,
    routing::{get, MethodRouter},
    Router,
};
use http_body_util::LengthLimitError;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::config::validation::parse_upstream;
use crate::config::ForumConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;
use crate::proxy::headers::{strip_hop_by_hop, ForwardContext, HeaderPolicy};
use crate::proxy::upstream::upstream_uri;
use crate::proxy::ProxyError;

/// State shared by every forwarded request.
#[derive(Clone)]
pub struct ProxyState {
    pub client: Client<HttpsConnector<HttpConnector>, Body>,
    pub upstream: Arc<Url>,
    pub headers: Arc<HeaderPolicy>,
    pub max_body_size: usize,
    pub upstream_timeout: Duration,
}

/// Browser-facing forwarding proxy.
pub struct EdgeProxy {
    router: Router,
    config: ForumConfig,
}

impl EdgeProxy {
    /// Create a proxy for `config.proxy.upstream`.
    pub fn new(config: ForumConfig) -> Result<Self, ProxyError> {
        let upstream = parse_upstream(&config.proxy.upstream).map_err(ProxyError::InvalidUpstream)?;

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = ProxyState {
            client,
            upstream: Arc::new(upstream),
            headers: Arc::new(HeaderPolicy::from_names(&config.proxy.forward_headers)),
            max_body_size: config.security.max_body_size,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    fn build_router(config: &ForumConfig, state: ProxyState) -> Router {
        let prefix = &config.proxy.path_prefix;
        Router::new()
            .route(prefix, forwarding())
            .route(&format!("{}/", prefix), forwarding())
            .route(&format!("{}/{{*path}}", prefix), forwarding())
            .with_state(state)
            .layer(middleware::from_fn_with_state("proxy", metrics::track_requests))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for in-process testing with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the proxy until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.proxy.upstream,
            prefix = %self.config.proxy.path_prefix,
            "Edge proxy starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("Edge proxy stopped");
        Ok(())
    }

    pub fn config(&self) -> &ForumConfig {
        &self.config
    }
}

fn forwarding() -> MethodRouter<ProxyState> {
    get(forward)
        .post(forward)
        .put(forward)
        .delete(forward)
        .patch(forward)
}

/// Forward one request upstream and relay the answer.
async fn forward(State(state): State<ProxyState>, request: Request) -> Result<Response, ProxyError> {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();

    let uri = upstream_uri(&state.upstream, parts.uri.path(), parts.uri.query())?;

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        upstream = %uri,
        "Forwarding request"
    );

    let body = axum::body::to_bytes(body, state.max_body_size)
        .await
        .map_err(body_read_error)?;

    let ctx = ForwardContext {
        request_id: &request_id,
        client_ip,
        scheme: parts.uri.scheme_str(),
    };
    let mut upstream_req = Request::new(Body::from(body));
    *upstream_req.method_mut() = parts.method.clone();
    *upstream_req.uri_mut() = uri;
    *upstream_req.headers_mut() = state.headers.forward_request_headers(&parts.headers, &ctx);

    let response = match tokio::time::timeout(state.upstream_timeout, state.client.request(upstream_req)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream_error("request");
            return Err(e.into());
        }
        Err(_) => {
            tracing::error!(
                request_id = %request_id,
                timeout = ?state.upstream_timeout,
                "Upstream timed out"
            );
            metrics::record_upstream_error("timeout");
            return Err(ProxyError::Timeout);
        }
    };

    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Ok(Response::from_parts(parts, Body::new(body)))
}

/// 413 when the body hit the size limit, 400 for any other read failure.
fn body_read_error(err: axum::Error) -> ProxyError {
    let mut source = std::error::Error::source(&err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return ProxyError::BodyTooLarge;
        }
        source = e.source();
    }
    tracing::warn!(error = %err, "Failed to read request body");
    ProxyError::BodyRead(err)
}
