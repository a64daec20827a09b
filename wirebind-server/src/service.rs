//! The single dispatch entry point
//!
//! [`DispatchService`] takes the raw body of a call, decodes it, hands it to
//! a generated dispatcher and logs the outcome. It owns no transport: put it
//! behind whatever HTTP or message listener the application runs.
//!
//! # Examples
//!
//! ```rust,ignore
//! use wirebind_server::{DispatchService, Request};
//!
//! let service = DispatchService::new(Handler::new(store)).with_metrics(DispatchMetrics::new());
//! let response = service
//!     .handle(Request::new(), br#"{"method":"math.add","args":[3,4]}"#)
//!     .await;
//! assert_eq!(response.body(), "7");
//! ```

use crate::dispatch::Dispatch;
use crate::metrics::DispatchMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use wirebind_core::{codec, ErrorBody, Request, WireResponse};

/// Decodes calls and routes them through a [`Dispatch`] implementation
///
/// Cheap to clone; clones share the dispatcher.
pub struct DispatchService<D> {
    dispatcher: Arc<D>,
    metrics: Option<DispatchMetrics>,
}

impl<D> Clone for DispatchService<D> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            metrics: self.metrics.clone(),
        }
    }
}

impl<D: Dispatch> DispatchService<D> {
    pub fn new(dispatcher: D) -> Self {
        Self::from_arc(Arc::new(dispatcher))
    }

    pub fn from_arc(dispatcher: Arc<D>) -> Self {
        Self {
            dispatcher,
            metrics: None,
        }
    }

    /// Record call counts and latency
    pub fn with_metrics(mut self, metrics: DispatchMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn methods(&self) -> &'static [&'static str] {
        self.dispatcher.methods()
    }

    /// Handle one call
    ///
    /// A body that is not a `{"method", "args"}` object is answered with
    /// `Bad Request` / `Invalid JSON` without reaching the dispatcher.
    pub async fn handle(&self, request: Request, body: &[u8]) -> WireResponse {
        let start = Instant::now();

        let (method, response) = match codec::decode_body(body) {
            Ok(body) => {
                let method = body.method.clone();
                let span = tracing::info_span!("dispatch", method = %method);
                let response = self
                    .dispatcher
                    .dispatch(Arc::new(request), Arc::new(body))
                    .instrument(span)
                    .await;
                (method, response)
            }
            Err(err) => {
                tracing::debug!(error = %err, "Rejected malformed request body");
                (
                    String::new(),
                    WireResponse::error(ErrorBody::bad_request("Invalid JSON")),
                )
            }
        };

        let elapsed = start.elapsed();
        match response.error_body() {
            None => {
                tracing::info!(
                    method = %method,
                    status = response.status(),
                    elapsed_us = elapsed.as_micros() as u64,
                    "Call succeeded"
                );
            }
            Some(error) => {
                tracing::warn!(
                    method = %method,
                    status = response.status(),
                    category = %error.error,
                    msg = %error.msg,
                    "Call failed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_error(error.error);
                }
            }
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_request(&method, response.status(), elapsed.as_secs_f64());
        }

        response
    }
}
