//! Endpoints: the handler-like type middleware takes and returns
//!
//! An [`Endpoint`] answers one decoded call. Generated dispatchers wrap each
//! procedure that has middleware in an endpoint, then pass it through the
//! route's middleware functions, each of shape
//! `fn(BoxEndpoint) -> BoxEndpoint`.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use wirebind_server::{from_fn, BoxEndpoint, Endpoint, ErrorBody, WireResponse};
//!
//! fn require_token(next: BoxEndpoint) -> BoxEndpoint {
//!     let next: Arc<dyn Endpoint> = Arc::from(next);
//!     from_fn(move |request, body| {
//!         let next = Arc::clone(&next);
//!         async move {
//!             if request.header("authorization").is_none() {
//!                 return WireResponse::error(ErrorBody::bad_request("missing token"));
//!             }
//!             next.call(request, body).await
//!         }
//!     })
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use wirebind_core::{Describe, Request, RequestBody, Schema, TypeNode, WireResponse};

/// Something that answers a decoded call
pub trait Endpoint: Send + Sync + 'static {
    fn call(&self, request: Arc<Request>, body: Arc<RequestBody>) -> BoxFuture<'static, WireResponse>;
}

/// Owned, type-erased endpoint passed through middleware
pub type BoxEndpoint = Box<dyn Endpoint>;

impl Describe for dyn Endpoint {
    fn describe(_schema: &mut Schema) -> TypeNode {
        TypeNode::Handler
    }
}

/// Endpoint backed by an async function
pub struct FnEndpoint<F> {
    func: F,
}

impl<F, Fut> Endpoint for FnEndpoint<F>
where
    F: Fn(Arc<Request>, Arc<RequestBody>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = WireResponse> + Send + 'static,
{
    fn call(&self, request: Arc<Request>, body: Arc<RequestBody>) -> BoxFuture<'static, WireResponse> {
        Box::pin((self.func)(request, body))
    }
}

/// Create an endpoint from an async function
pub fn from_fn<F, Fut>(func: F) -> BoxEndpoint
where
    F: Fn(Arc<Request>, Arc<RequestBody>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = WireResponse> + Send + 'static,
{
    Box::new(FnEndpoint { func })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_endpoint() {
        let endpoint = from_fn(|_request, body| async move {
            WireResponse::ok(&body.args.len())
        });

        let body = RequestBody::from_values("count", &[json!(1), json!(2)]).unwrap();
        let response = endpoint.call(Arc::new(Request::new()), Arc::new(body)).await;
        assert_eq!(response.body(), "2");
    }

    #[test]
    fn test_endpoint_describes_as_handler() {
        let mut schema = Schema::new();
        assert_eq!(schema.describe::<BoxEndpoint>(), TypeNode::Handler);
    }
}
