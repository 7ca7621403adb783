//! HTTP request handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;
use url::Url;

use crate::authn::gate;
use crate::deploy::model::Deployment;
use crate::errors::AdminError;
use crate::plugins::lifecycle::{StateChange, StateChangeOutcome};
use crate::server::serve::ADMIN_BASE;
use crate::server::state::ServerState;

/// GET `/pluton/admin/plugins` — ordered listing of deployed plugins.
pub async fn list_plugins_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AdminError> {
    gate::admin_caller(state.identity.as_ref(), &headers).await?;
    let plugins = state.controller.list_plugins().await?;
    Ok(Json(plugins))
}

/// GET `/pluton/admin/cicd/result` — deployment history, most recent first.
///
/// Unauthenticated by contract; store failures are caught here and rendered
/// as a 400 with the underlying message rather than bubbling up.
pub async fn deployment_history_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.history.list().await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            let message = format!("Failed to fetch the deployment history: {}", e);
            error!("{}", message);
            (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
        }
    }
}

/// POST `/pluton/admin/auth` — credential probe; reaching the body means
/// the gate already admitted the caller.
pub async fn auth_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AdminError> {
    gate::admin_caller(state.identity.as_ref(), &headers).await?;
    Ok(StatusCode::CREATED)
}

/// POST `/pluton/admin/cicd` — trigger the deployment pipeline.
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(mut dep): Json<Deployment>,
) -> Response {
    if let Err(e) = gate::admin_caller(state.identity.as_ref(), &headers).await {
        return e.into_response();
    }

    // Missing mandatory fields answer with the request object itself,
    // annotated with the diagnostic, before anything touches the
    // filesystem.
    if let Some(field) = dep.missing_field() {
        dep.msg = Some(format!("Field {} is mandatory", field));
        return (StatusCode::BAD_REQUEST, Json(dep)).into_response();
    }

    // The gate already proved the header decodes; the raw credentials are
    // re-extracted here because the build tool needs them as parameters.
    let credentials = match gate::basic_credentials(&headers) {
        Ok(credentials) => credentials,
        Err(e) => return e.into_response(),
    };

    let callback_url = derive_callback_url(&headers);

    match state.pipeline.deploy(dep, &credentials, callback_url).await {
        Ok(result) => (StatusCode::CREATED, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE `/pluton/admin/plugins/{id}/{version}`
pub async fn delete_plugin_handler(
    State(state): State<Arc<ServerState>>,
    Path((plugin_id, version)): Path<(i32, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, AdminError> {
    let user = gate::admin_caller(state.identity.as_ref(), &headers).await?;
    let version = parse_version(&version)?;
    let deleted = state
        .controller
        .delete_version(plugin_id, version, &user)
        .await?;
    Ok(if deleted {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    })
}

/// PATCH `/pluton/admin/plugins/{id}/{version}` — enable/disable transition.
pub async fn change_state_handler(
    State(state): State<Arc<ServerState>>,
    Path((plugin_id, version)): Path<(i32, String)>,
    headers: HeaderMap,
    Json(desired): Json<StateChange>,
) -> Result<Response, AdminError> {
    let user = gate::admin_caller(state.identity.as_ref(), &headers).await?;
    let version = parse_version(&version)?;
    let outcome = state
        .controller
        .change_state(plugin_id, version, &desired, &user)
        .await?;
    Ok(match outcome {
        StateChangeOutcome::Updated(summary) => (StatusCode::OK, Json(summary)).into_response(),
        StateChangeOutcome::Unchanged => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Dispatch for everything the explicit routes do not cover.
///
/// GET falls through to static asset serving without authorization;
/// unmapped POST/PUT/PATCH authorize first and then name the unmatched
/// path in a 404; DELETE outside the plugin-version route is a 400.
pub async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method == Method::GET {
        return serve_asset(&state, uri.path()).await;
    }

    if method == Method::POST || method == Method::PUT || method == Method::PATCH {
        if let Err(e) = gate::admin_caller(state.identity.as_ref(), &headers).await {
            return e.into_response();
        }
        return AdminError::UnmappedRoute(uri.path().to_string()).into_response();
    }

    if method == Method::DELETE {
        if let Err(e) = gate::admin_caller(state.identity.as_ref(), &headers).await {
            return e.into_response();
        }
        return StatusCode::BAD_REQUEST.into_response();
    }

    StatusCode::BAD_REQUEST.into_response()
}

async fn serve_asset(state: &ServerState, path: &str) -> Response {
    let rel = path.strip_prefix(ADMIN_BASE).unwrap_or(path);
    match state.assets.load(rel).await {
        Ok((content_type, bytes)) => {
            ([(CONTENT_TYPE, content_type)], bytes).into_response()
        }
        Err(e) => e.into_response(),
    }
}

fn parse_version(version: &str) -> Result<f64, AdminError> {
    version
        .parse()
        .map_err(|_| AdminError::MalformedRequest(format!("Invalid plugin version: {}", version)))
}

/// Callback URL for the build tool: the scheme and authority of the
/// inbound request with the admin path discarded. The scheme honors
/// `X-Forwarded-Proto` when a proxy terminates TLS in front of the
/// daemon. Derivation failure is non-fatal; the pipeline simply runs
/// without a callback.
fn derive_callback_url(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(HOST)?.to_str().ok()?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let url = Url::parse(&format!("{}://{}", scheme, host)).ok()?;
    Some(url.to_string().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn callback_url_uses_the_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("runtime.example.com:8080"));
        assert_eq!(
            derive_callback_url(&headers).as_deref(),
            Some("http://runtime.example.com:8080")
        );
    }

    #[test]
    fn callback_url_honors_forwarded_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("runtime.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(
            derive_callback_url(&headers).as_deref(),
            Some("https://runtime.example.com")
        );
    }

    #[test]
    fn missing_host_yields_no_callback() {
        assert_eq!(derive_callback_url(&HeaderMap::new()), None);
    }
}
