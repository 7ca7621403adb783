//! Admin authorization gate
//!
//! Every mutating admin endpoint passes through [`admin_caller`] before any
//! work happens; an `Err` means the 401/400 response is already determined
//! and the handler must stop.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::authn::identity::{AdminUser, IdentityProvider};
use crate::errors::AdminError;

/// Basic-auth credentials as presented by the caller.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Decode the `Authorization: Basic` header into credentials.
///
/// A missing or malformed header is a hard precondition failure; there is
/// no anonymous fallback.
pub fn basic_credentials(headers: &HeaderMap) -> Result<Credentials, AdminError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AdminError::Authorization("Missing Authorization header".to_string()))?;

    let encoded = header
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| AdminError::Authorization("Malformed Authorization header".to_string()))?;

    let decoded = BASE64
        .decode(encoded)
        .map_err(|e| AdminError::Authorization(format!("Malformed Authorization header: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| AdminError::Authorization(format!("Malformed Authorization header: {}", e)))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AdminError::Authorization("Malformed Authorization header".to_string()))?;

    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Pure admin predicate over an authenticated caller.
pub fn authorize(user: &AdminUser) -> Result<(), AdminError> {
    if user.admin {
        Ok(())
    } else {
        Err(AdminError::Authorization(format!(
            "The user: {} does not have admin permissions.",
            user.username
        )))
    }
}

/// Resolve the caller from the request headers and admit only admins.
pub async fn admin_caller(
    identity: &dyn IdentityProvider,
    headers: &HeaderMap,
) -> Result<AdminUser, AdminError> {
    let credentials = basic_credentials(headers)?;
    let user = identity
        .authenticate(&credentials.username, &credentials.password)
        .await?;
    authorize(&user)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn decodes_basic_header() {
        // base64("admin:secret")
        let headers = headers_with("Basic YWRtaW46c2VjcmV0");
        let creds = basic_credentials(&headers).unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn password_may_contain_colons() {
        // base64("admin:a:b:c") splits on the first colon only
        let headers = headers_with("Basic YWRtaW46YTpiOmM=");
        let creds = basic_credentials(&headers).unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "a:b:c");
    }

    #[test]
    fn rejects_missing_and_malformed_headers() {
        assert!(basic_credentials(&HeaderMap::new()).is_err());
        assert!(basic_credentials(&headers_with("Basic")).is_err());
        assert!(basic_credentials(&headers_with("Basic !!notbase64!!")).is_err());
    }

    #[test]
    fn authorize_names_the_rejected_user() {
        let user = AdminUser {
            username: "guest".to_string(),
            admin: false,
        };
        let err = authorize(&user).unwrap_err();
        assert!(err.to_string().contains("guest"));
    }
}
