//! Runtime for generated wirebind dispatchers
//!
//! The code generator emits a `Handler` type that implements [`Dispatch`].
//! This crate provides everything that generated code refers to, plus the
//! [`DispatchService`] entry point that turns raw request bodies into
//! [`WireResponse`]s.
//!
//! # Request flow
//!
//! 1. [`DispatchService::handle`] decodes the body (`{"method", "args"}`)
//! 2. the generated `dispatch` matches the method name
//! 3. the per-method handler resolves context values, decodes wire
//!    arguments positionally, calls the procedure and encodes the result
//! 4. routes with middleware run the handler as an [`Endpoint`] wrapped by
//!    each middleware function
//!
//! Each call runs on its own request-local state; the generated `Handler`
//! only shares its read-only dependencies. There is no timeout: a procedure
//! or extractor that never completes holds its call open indefinitely.

mod dispatch;
mod endpoint;
mod metrics;
pub mod middleware;
mod service;

pub use dispatch::{decode_arg, unknown_method, Dispatch};
pub use endpoint::{from_fn, BoxEndpoint, Endpoint, FnEndpoint};
pub use metrics::DispatchMetrics;
pub use service::DispatchService;

pub use futures::future::BoxFuture;
pub use wirebind_core::{ErrorBody, ErrorCategory, Request, RequestBody, WireResponse};
