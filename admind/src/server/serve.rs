//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::AdminError;
use crate::server::handlers::{
    auth_handler, change_state_handler, delete_plugin_handler, deploy_handler,
    deployment_history_handler, fallback_handler, list_plugins_handler,
};
use crate::server::state::ServerState;
use crate::storage::settings::ServerSettings;

/// Base path of the administration surface.
pub const ADMIN_BASE: &str = "/pluton/admin";

/// Build the administration router.
///
/// Dispatch is method-first: a registered path hit with a different verb
/// must take the same route as an unknown path (GET falls through to
/// static assets, unmapped POST/PUT/PATCH answer 404 naming the path),
/// so every method router carries the shared fallback instead of axum's
/// default 405.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Plugin listing and lifecycle
        .route(
            &format!("{ADMIN_BASE}/plugins"),
            get(list_plugins_handler).fallback(fallback_handler),
        )
        .route(
            &format!("{ADMIN_BASE}/plugins/{{id}}/{{version}}"),
            axum::routing::delete(delete_plugin_handler)
                .patch(change_state_handler)
                .fallback(fallback_handler),
        )
        // Deployment pipeline and history
        .route(
            &format!("{ADMIN_BASE}/cicd"),
            post(deploy_handler).fallback(fallback_handler),
        )
        .route(
            &format!("{ADMIN_BASE}/cicd/result"),
            get(deployment_history_handler).fallback(fallback_handler),
        )
        .route(
            &format!("{ADMIN_BASE}/cicd/result/{{*rest}}"),
            get(deployment_history_handler).fallback(fallback_handler),
        )
        // Credential probe
        .route(
            &format!("{ADMIN_BASE}/auth"),
            post(auth_handler).fallback(fallback_handler),
        )
        // Everything else: static assets / unmapped-route diagnostics
        .fallback(fallback_handler)
        .with_state(state)
        // Verb gate and CORS preflight run before routing
        .layer(middleware::from_fn(verb_gate))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerSettings,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), AdminError>>, AdminError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting admin HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AdminError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| AdminError::ServerError(e.to_string()))
    });

    Ok(handle)
}

/// OPTIONS answers the CORS preflight unconditionally, before routing and
/// without consulting the authorization gate; verbs outside the supported
/// set are rejected with 400 outright.
async fn verb_gate(req: Request, next: Next) -> Response {
    let method = req.method();
    if method == Method::OPTIONS {
        return preflight_response();
    }
    if method == Method::GET
        || method == Method::POST
        || method == Method::DELETE
        || method == Method::PATCH
        || method == Method::PUT
    {
        return next.run(req).await;
    }
    StatusCode::BAD_REQUEST.into_response()
}

fn preflight_response() -> Response {
    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,HEAD,OPTIONS,POST,PUT,PATCH,DELETE"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static(
            "Access-Control-Allow-Headers, Origin,Accept, X-Requested-With, Authorization, \
             Content-Type, Access-Control-Request-Method, Access-Control-Request-Headers",
        ),
    );
    response
}
