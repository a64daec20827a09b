//! Request-derived session and the admin guard

use std::sync::Arc;
use thiserror::Error;
use wirebind::server::{from_fn, BoxEndpoint, Endpoint};
use wirebind::{describe_fn, Describe, ErrorBody, Request, WireResponse};

/// Caller identity, resolved per call from the `authorization` header
#[derive(Debug, Clone, PartialEq, Describe)]
pub struct Session {
    pub user: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    Missing,
    #[error("malformed authorization header")]
    Malformed,
}

/// Accepts `Bearer <user>`
#[describe_fn]
pub async fn session(request: &Request) -> Result<Session, AuthError> {
    let header = request.header("authorization").ok_or(AuthError::Missing)?;
    let user = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .ok_or(AuthError::Malformed)?;
    Ok(Session {
        user: user.to_string(),
    })
}

/// Reject calls without `x-role: admin`
#[describe_fn]
pub fn require_admin(next: BoxEndpoint) -> BoxEndpoint {
    let next: Arc<dyn Endpoint> = Arc::from(next);
    from_fn(move |request, body| {
        let next = Arc::clone(&next);
        async move {
            if request.header("x-role") != Some("admin") {
                tracing::debug!(method = %body.method, "Rejected non-admin call");
                return WireResponse::error(ErrorBody::bad_request("admin role required"));
            }
            next.call(request, body).await
        }
    })
}
