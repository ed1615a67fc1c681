//! Route table and router assembly.
//!
//! # Responsibilities
//! - Declare the gateway's fixed method + path table
//! - Classify a request as local (health) or forward
//! - Build the axum router, with admission control on forward routes only
//!
//! # Design Decisions
//! - Path parameters are opaque; `{id}` is matched, never read
//! - `/health` is exempt from rate limiting
//! - Unmatched requests get a JSON 404 and never reach the backend
//! - A known path with an unregistered method gets a JSON 405
//! - Static paths only shadow a parameterised route for the methods they
//!   register; other methods still reach the parameterised route
//! - `HEAD` follows the `GET` entries and is forwarded as `HEAD`

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, on, MethodFilter},
    Json, Router,
};

use crate::error::GatewayError;
use crate::http::server::AppState;
use crate::security::rate_limit::rate_limit_middleware;

/// What the gateway does with a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    /// Answered by the gateway itself.
    Health,
    /// Admission-checked, then forwarded to the backend.
    Forward,
}

/// A single entry of the route table.
#[derive(Debug, Clone, Copy)]
pub struct GatewayRoute {
    pub method: MethodFilter,
    pub path: &'static str,
    pub action: RouteAction,
}

/// The complete inbound surface.
pub const ROUTES: &[GatewayRoute] = &[
    GatewayRoute { method: MethodFilter::GET, path: "/health", action: RouteAction::Health },
    GatewayRoute { method: MethodFilter::POST, path: "/drivers", action: RouteAction::Forward },
    GatewayRoute { method: MethodFilter::PUT, path: "/drivers/{id}", action: RouteAction::Forward },
    GatewayRoute { method: MethodFilter::GET, path: "/drivers", action: RouteAction::Forward },
    GatewayRoute { method: MethodFilter::GET, path: "/drivers/nearby", action: RouteAction::Forward },
];

/// Look up the action for a method and raw path.
pub fn classify(method: &Method, path: &str) -> Option<RouteAction> {
    // per method, a static path wins over a parameterised one
    ROUTES
        .iter()
        .filter(|route| method_matches(route.method, method) && path_matches(route.path, path))
        .min_by_key(|route| is_parameterised(route.path))
        .map(|route| route.action)
}

/// Parameterised entries re-registered on the static paths they match, for
/// methods the static path does not claim itself.
///
/// The axum matcher picks a static path over a parameterised one regardless
/// of method, so `PUT /drivers/nearby` would otherwise be a 405.
fn shadowed_routes() -> Vec<GatewayRoute> {
    let mut extra: Vec<GatewayRoute> = Vec::new();
    for param in ROUTES.iter().filter(|route| is_parameterised(route.path)) {
        for fixed in ROUTES
            .iter()
            .filter(|route| !is_parameterised(route.path) && path_matches(param.path, route.path))
        {
            let taken = ROUTES
                .iter()
                .chain(extra.iter())
                .any(|route| route.path == fixed.path && route.method == param.method);
            if !taken {
                extra.push(GatewayRoute { path: fixed.path, ..*param });
            }
        }
    }
    extra
}

fn is_parameterised(pattern: &str) -> bool {
    pattern.contains('{')
}

fn method_matches(filter: MethodFilter, method: &Method) -> bool {
    match MethodFilter::try_from(method.clone()) {
        // axum serves HEAD from the GET handler
        Ok(m) if m == MethodFilter::HEAD => filter == MethodFilter::GET || filter == m,
        Ok(m) => filter == m,
        Err(_) => false,
    }
}

fn path_matches(pattern: &str, path: &str) -> bool {
    let mut expected = pattern.split('/');
    let mut actual = path.split('/');
    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return true,
            (Some(e), Some(a)) if e.starts_with('{') && e.ends_with('}') => {
                if a.is_empty() {
                    return false;
                }
            }
            (Some(e), Some(a)) if e == a => {}
            _ => return false,
        }
    }
}

/// Assemble the router from [`ROUTES`].
pub fn build_router(state: AppState) -> Router {
    let mut forward = Router::new();
    let mut local = Router::new();

    for route in ROUTES.iter().copied().chain(shadowed_routes()) {
        match route.action {
            RouteAction::Forward => {
                forward = forward.route(route.path, on(route.method, forward_handler));
            }
            RouteAction::Health => {
                local = local.route(route.path, get(health_handler));
            }
        }
    }

    let forward = forward.route_layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit_middleware,
    ));

    forward
        .merge(local)
        .fallback(not_found_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "api-gateway",
    }))
}

async fn forward_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    state.forwarder.forward(request).await
}

async fn not_found_handler(request: Request<Body>) -> GatewayError {
    tracing::debug!(method = %request.method(), path = %request.uri().path(), "No route matched");
    GatewayError::NotFound
}

async fn method_not_allowed_handler(request: Request<Body>) -> GatewayError {
    tracing::debug!(method = %request.method(), path = %request.uri().path(), "Method not allowed");
    GatewayError::MethodNotAllowed
}
