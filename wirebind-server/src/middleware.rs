//! Built-in middleware
//!
//! Middleware in wirebind is a plain function `fn(BoxEndpoint) -> BoxEndpoint`
//! placed before the procedure in a route. Entries run outermost first: in
//! the route `[a, b, procedure]`, `a` sees the call before `b` does.
//!
//! [`logging`] records the method, status and latency of every call that
//! passes through it. Register it in a schema with [`logging_descriptor`]:
//!
//! ```rust
//! use wirebind_core::Schema;
//!
//! let mut schema = Schema::new();
//! schema.add_function(wirebind_server::middleware::logging_descriptor);
//! assert!(schema.function("wirebind::server::middleware::logging").unwrap().is_middleware());
//! ```

use crate::endpoint::{from_fn, BoxEndpoint, Endpoint};
use std::sync::Arc;
use std::time::Instant;
use wirebind_core::{FunctionDescriptor, FunctionSig, Param, Passing, Schema};

/// Log every call passing through `next`
pub fn logging(next: BoxEndpoint) -> BoxEndpoint {
    let next: Arc<dyn Endpoint> = Arc::from(next);
    from_fn(move |request, body| {
        let next = Arc::clone(&next);
        async move {
            let method = body.method.clone();
            let start = Instant::now();
            tracing::debug!(method = %method, args = body.args.len(), "Call started");

            let response = next.call(request, body).await;

            tracing::info!(
                method = %method,
                status = response.status(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "Call finished"
            );
            response
        }
    })
}

/// Schema entry for [`logging`]
pub fn logging_descriptor(schema: &mut Schema) -> FunctionDescriptor {
    let handler = schema.describe::<BoxEndpoint>();
    FunctionDescriptor {
        signature: FunctionSig::new("wirebind::server::middleware::logging")
            .param(Param::new(handler.clone(), Passing::Owned))
            .result(handler),
        param_names: vec!["next".to_string()],
    }
}
