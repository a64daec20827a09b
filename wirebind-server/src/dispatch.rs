//! The contract between generated dispatchers and the runtime
//!
//! A generated `Handler` implements [`Dispatch`]; the helpers below are what
//! its per-method code calls to decode arguments and build error responses.

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use wirebind_core::{codec, ErrorBody, Request, RequestBody, WireResponse};

/// A method table produced by the code generator
pub trait Dispatch: Send + Sync + 'static {
    /// Every method name this dispatcher answers, sorted
    fn methods(&self) -> &'static [&'static str];

    /// Route one call by its method name
    ///
    /// Always produces exactly one response; unknown names yield a
    /// `Bad Request`.
    fn dispatch(&self, request: Arc<Request>, body: Arc<RequestBody>) -> BoxFuture<'_, WireResponse>;
}

impl<D: Dispatch> Dispatch for Arc<D> {
    fn methods(&self) -> &'static [&'static str] {
        (**self).methods()
    }

    fn dispatch(&self, request: Arc<Request>, body: Arc<RequestBody>) -> BoxFuture<'_, WireResponse> {
        (**self).dispatch(request, body)
    }
}

/// Decode the `index`-th wire argument, reporting failure as `Invalid JSON`
pub fn decode_arg<T: DeserializeOwned>(body: &RequestBody, index: usize) -> Result<T, ErrorBody> {
    codec::decode_arg(body, index).map_err(|err| ErrorBody::invalid_json(err.detail()))
}

/// Response for a method name with no route
pub fn unknown_method(method: &str) -> WireResponse {
    WireResponse::error(ErrorBody::bad_request(format!("unknown method: {method}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wirebind_core::ErrorCategory;

    #[test]
    fn test_decode_arg_reports_invalid_json() {
        let body = RequestBody::from_values("math.add", &[json!("x"), json!(4)]).unwrap();
        let err = decode_arg::<i32>(&body, 0).unwrap_err();
        assert_eq!(err.error, ErrorCategory::InvalidJson);
        assert!(err.msg.contains("invalid type"));

        let b: i32 = decode_arg(&body, 1).unwrap();
        assert_eq!(b, 4);
    }

    #[test]
    fn test_decode_arg_u128_round_trip() {
        let body = codec::decode_body(
            br#"{"method":"big.echo","args":[340282366920938463463374607431768211455]}"#,
        )
        .unwrap();
        let value: u128 = decode_arg(&body, 0).unwrap();
        assert_eq!(value, u128::MAX);
        assert_eq!(WireResponse::ok(&value).body(), "340282366920938463463374607431768211455");
    }

    #[test]
    fn test_unknown_method() {
        let response = unknown_method("nope.nothing");
        assert_eq!(response.status(), 400);
        let body = response.error_body().unwrap();
        assert_eq!(body.error, ErrorCategory::BadRequest);
        assert_eq!(body.msg, "unknown method: nope.nothing");
    }
}
