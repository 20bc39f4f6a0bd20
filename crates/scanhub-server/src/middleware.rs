//! Request correlation and cross-cutting layers.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::extract::{ConnectInfo, Request};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use scanhub_core::RequestContext;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, info_span};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assign a correlation id to the request and run it inside a span
/// carrying that id.
///
/// The [`RequestContext`] is stored in request extensions for handlers and
/// extractors, and the id is echoed in the `x-request-id` response header.
pub async fn request_context(mut req: Request, next: Next) -> Response {
    let ctx = RequestContext::generate();
    let span = info_span!(
        "request",
        request_id = %ctx.request_id(),
        method = %req.method(),
        path = %req.uri().path(),
    );

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let ip = client_ip(req.headers(), peer).map_or_else(String::new, |ip| ip.to_string());
    let agent = header_str(req.headers(), &header::USER_AGENT).to_string();
    let referer = header_str(req.headers(), &header::REFERER).to_string();
    let header_value = HeaderValue::from_str(ctx.request_id()).ok();
    req.extensions_mut().insert(ctx);

    async move {
        info!(%ip, %agent, %referer, "incoming request");
        let mut response = next.run(req).await;
        if let Some(value) = header_value {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Best guess at the caller's address.
///
/// `X-Real-IP` wins, then the first valid `X-Forwarded-For` entry, then the
/// socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> Option<IpAddr> {
    if let Ok(ip) = header_str(headers, "x-real-ip").trim().parse() {
        return Some(ip);
    }
    header_str(headers, "x-forwarded-for")
        .split(',')
        .find_map(|candidate| candidate.trim().parse().ok())
        .or(peer)
}

fn header_str<K: header::AsHeaderName>(headers: &HeaderMap, name: K) -> &str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// CORS policy applied to every route.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::ACCESS_CONTROL_REQUEST_METHOD,
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::USER_AGENT,
            header::ACCEPT_LANGUAGE,
            header::REFERER,
            HeaderName::from_static("dnt"),
            header::CONNECTION,
            header::PRAGMA,
            header::CACHE_CONTROL,
            header::TE,
        ])
        .expose_headers([header::CONTENT_LENGTH, HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60))
}

/// HTTP access tracing.
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn real_ip_header_wins() {
        let map = headers(&[("x-real-ip", "10.0.0.1"), ("x-forwarded-for", "10.0.0.2")]);
        assert_eq!(client_ip(&map, None), Some("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn first_valid_forwarded_entry_is_used() {
        let map = headers(&[
            ("x-real-ip", "garbage"),
            ("x-forwarded-for", "nope, 192.168.1.7, 10.0.0.2"),
        ]);
        assert_eq!(client_ip(&map, None), Some("192.168.1.7".parse().unwrap()));
    }

    #[test]
    fn falls_back_to_peer_address() {
        let peer: IpAddr = "127.0.0.1".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), Some(peer));
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }
}
