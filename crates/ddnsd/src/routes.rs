//! HTTP surface of the daemon
//!
//! A single route, `GET /domains/{domain}?token={token}`. The handler only
//! gathers what the request carries and hands it to [`DdnsEngine::handle`];
//! the response is a bare status code with an empty body.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{ConnectInfo, Path, Query, State},
    http::{Extensions, HeaderMap, StatusCode, Uri},
    routing::get,
};
use ddns_core::{DdnsEngine, RequestPeer, UpdateRequest};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Query string of the update route
#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuery {
    pub token: Option<String>,
}

/// Update a domain's A record to the caller's IP
pub async fn update_domain(
    State(engine): State<Arc<DdnsEngine>>,
    Path(domain): Path<String>,
    Query(query): Query<UpdateQuery>,
    headers: HeaderMap,
    uri: Uri,
    extensions: Extensions,
) -> StatusCode {
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let remote_addr = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    // Path only, the token stays out of the logs
    let request = UpdateRequest {
        domain: Some(domain),
        token: query.token,
        peer: RequestPeer::new(forwarded_for, remote_addr),
        url: uri.path().to_string(),
    };

    match engine.handle(&request).await {
        Ok(_) => StatusCode::OK,
        Err(rejection) => StatusCode::from_u16(rejection.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Build the application router
pub fn router(engine: Arc<DdnsEngine>) -> Router {
    Router::new()
        .route("/domains/{domain}", get(update_domain))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}
