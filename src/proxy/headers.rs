//! Header filtering for forwarded requests and relayed responses.
//!
//! # Rules
//! - Request headers are forwarded only when their name is allow-listed
//! - `Host`, `Content-Length` and hop-by-hop headers never go upstream
//! - `X-Forwarded-*` from the client are dropped and set fresh
//! - Response headers are relayed except hop-by-hop ones

use std::collections::HashSet;
use std::net::IpAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::http::X_REQUEST_ID;

/// Headers that only describe a single connection.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// What the proxy knows about the inbound request beyond its headers.
#[derive(Debug, Clone, Default)]
pub struct ForwardContext<'a> {
    pub request_id: &'a str,
    pub client_ip: Option<IpAddr>,
    /// Scheme the client used to reach the proxy. The listener is plain
    /// HTTP, so `None` means `http`.
    pub scheme: Option<&'a str>,
}

/// Allow-list of request headers copied upstream.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    allowed: HashSet<HeaderName>,
}

impl HeaderPolicy {
    /// Build from configured names. Invalid names are skipped (config
    /// validation reports them) and connection-level names are never allowed.
    pub fn from_names(names: &[String]) -> Self {
        let allowed = names
            .iter()
            .filter_map(|n| HeaderName::from_bytes(n.trim().as_bytes()).ok())
            .filter(|n| !is_connection_level(n))
            .collect();
        Self { allowed }
    }

    pub fn allows(&self, name: &HeaderName) -> bool {
        self.allowed.contains(name)
    }

    /// Headers for the upstream request.
    pub fn forward_request_headers(&self, inbound: &HeaderMap, ctx: &ForwardContext<'_>) -> HeaderMap {
        let listed_in_connection = connection_tokens(inbound);
        let mut out = HeaderMap::new();

        for (name, value) in inbound.iter() {
            if self.allows(name) && !listed_in_connection.contains(name) {
                out.append(name.clone(), value.clone());
            }
        }

        if let Ok(id) = HeaderValue::from_str(ctx.request_id) {
            out.insert(X_REQUEST_ID, id);
        }
        if let Some(ip) = ctx.client_ip {
            if let Ok(v) = HeaderValue::from_str(&ip.to_string()) {
                out.insert(X_FORWARDED_FOR, v);
            }
        }
        if let Some(host) = inbound.get(header::HOST) {
            out.insert(X_FORWARDED_HOST, host.clone());
        }
        let scheme = ctx.scheme.unwrap_or("http");
        if let Ok(v) = HeaderValue::from_str(scheme) {
            out.insert(X_FORWARDED_PROTO, v);
        }

        out
    }
}

/// Remove hop-by-hop headers (and any named by `Connection`) in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in connection_tokens(headers) {
        headers.remove(&name);
    }
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

fn is_connection_level(name: &HeaderName) -> bool {
    name == header::HOST
        || name == header::CONTENT_LENGTH
        || name == X_FORWARDED_FOR
        || name == X_FORWARDED_HOST
        || name == X_FORWARDED_PROTO
        || HOP_BY_HOP.contains(name)
}

/// Header names listed in `Connection: a, b`.
fn connection_tokens(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect()
}
