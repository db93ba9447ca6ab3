//! Custom Axum Extractors

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use http::{header, HeaderMap};
use leadbase_types::RequestOrigin;
use std::convert::Infallible;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Client address and user agent of the request, for the audit trail.
///
/// The address is the first `X-Forwarded-For` entry when a proxy set one,
/// otherwise the peer address of the connection (only known when the
/// server runs with connect info).
#[derive(Debug, Clone, Default)]
pub struct ClientOrigin(pub RequestOrigin);

#[async_trait]
impl<S> FromRequestParts<S> for ClientOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(ClientOrigin(RequestOrigin::new(
            forwarded_for(&parts.headers).or(peer),
            header_value(&parts.headers, header::USER_AGENT.as_str()),
        )))
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    header_value(headers, X_FORWARDED_FOR)?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
