//! Dispatch metrics
//!
//! OpenTelemetry instruments recorded by [`DispatchService`](crate::DispatchService).
//! All names are prefixed with `wirebind.dispatch.*`.
//!
//! - **requests.total**: calls handled, by method and status (counter)
//! - **request.duration**: handling latency in seconds (histogram)
//! - **errors.total**: failed calls, by error category (counter)
//!
//! ```rust,no_run
//! use wirebind_server::DispatchMetrics;
//!
//! let metrics = DispatchMetrics::new();
//! metrics.record_request("math.add", 200, 0.002);
//! ```

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};
use wirebind_core::ErrorCategory;

/// Instruments for dispatch activity
#[derive(Clone)]
pub struct DispatchMetrics {
    pub requests_total: Counter<u64>,
    pub request_duration: Histogram<f64>,
    pub errors_total: Counter<u64>,
}

impl DispatchMetrics {
    /// Instruments on the global `wirebind` meter
    pub fn new() -> Self {
        Self::with_meter(&global::meter("wirebind"))
    }

    pub fn with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("wirebind.dispatch.requests.total")
                .with_description("Total number of calls dispatched")
                .build(),
            request_duration: meter
                .f64_histogram("wirebind.dispatch.request.duration")
                .with_description("Call handling duration in seconds")
                .with_unit("s")
                .build(),
            errors_total: meter
                .u64_counter("wirebind.dispatch.errors.total")
                .with_description("Total number of failed calls")
                .build(),
        }
    }

    pub fn record_request(&self, method: &str, status: u16, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", i64::from(status)),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    pub fn record_error(&self, category: ErrorCategory) {
        self.errors_total
            .add(1, &[KeyValue::new("category", category.as_str())]);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}
