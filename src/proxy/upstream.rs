//! Upstream URL construction.

use axum::http::Uri;
use url::Url;

use crate::proxy::ProxyError;

/// Build the upstream URI for an inbound request.
///
/// Scheme and authority come from `base`; path and query come from the
/// inbound request, replacing any path on the base.
pub fn upstream_uri(base: &Url, path: &str, query: Option<&str>) -> Result<Uri, ProxyError> {
    let mut url = base.clone();
    url.set_path(path);
    url.set_query(query);
    url.set_fragment(None);

    url.as_str()
        .parse::<Uri>()
        .map_err(|e| ProxyError::InvalidUpstream(format!("{}: {}", url, e)))
}
