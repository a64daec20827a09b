//! Logging and telemetry setup
//!
//! wirebind logs through `tracing`. Code generation reports progress at
//! `info` and per-method detail at `debug`; the dispatch service logs one
//! event per request. This module installs the subscriber that receives
//! those events and, optionally, exports traces and metrics to an OTLP
//! collector.
//!
//! ```rust,no_run
//! use wirebind_core::{LogFormat, ObservabilityConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let telemetry = ObservabilityConfig::new("demo-server")
//!         .with_endpoint("http://localhost:4317")
//!         .with_log_format(LogFormat::Json)
//!         .init()
//!         .expect("telemetry");
//!
//!     // ... serve requests ...
//!
//!     telemetry.shutdown();
//! }
//! ```
//!
//! `RUST_LOG` takes precedence over the configured level when set.

use crate::error::{Error, Result};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::time::Duration;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Stream local log lines are written to
///
/// Programs that answer on stdout log to stderr so the two never interleave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogTarget {
    #[default]
    Stdout,
    Stderr,
}

impl LogTarget {
    fn make_writer(self) -> BoxMakeWriter {
        match self {
            LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Local log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Telemetry configuration
///
/// Without an endpoint only local logging is installed.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub service_name: String,
    pub service_version: String,
    /// OTLP/gRPC collector, such as `http://localhost:4317`
    pub otlp_endpoint: Option<String>,
    pub export_traces: bool,
    pub export_metrics: bool,
    /// How often the metric reader pushes to the collector
    pub metrics_interval: Duration,
    pub log_format: LogFormat,
    pub log_target: LogTarget,
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "wirebind".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
            export_traces: true,
            export_metrics: true,
            metrics_interval: Duration::from_secs(30),
            log_format: LogFormat::Pretty,
            log_target: LogTarget::Stdout,
            log_level: "info".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    /// Disable OTLP export entirely
    pub fn without_export(mut self) -> Self {
        self.otlp_endpoint = None;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    pub fn with_traces(mut self, enable: bool) -> Self {
        self.export_traces = enable;
        self
    }

    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.export_metrics = enable;
        self
    }

    pub fn with_metrics_interval(mut self, interval: Duration) -> Self {
        self.metrics_interval = interval;
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    pub fn with_log_target(mut self, target: LogTarget) -> Self {
        self.log_target = target;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Install the global subscriber and any configured exporters
    pub fn init(self) -> Result<TelemetryGuard> {
        init_observability(self)
    }

    fn exports_traces(&self) -> bool {
        self.otlp_endpoint.is_some() && self.export_traces
    }

    fn exports_metrics(&self) -> bool {
        self.otlp_endpoint.is_some() && self.export_metrics
    }

    fn resource(&self) -> Resource {
        Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }
}

/// Owns the installed providers; flushes them on [`TelemetryGuard::shutdown`]
#[derive(Debug, Default)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
}

impl TelemetryGuard {
    pub fn exports_traces(&self) -> bool {
        self.tracer_provider.is_some()
    }

    pub fn exports_metrics(&self) -> bool {
        self.meter_provider.is_some()
    }

    /// Flush pending spans and metrics and stop the exporters
    pub fn shutdown(self) {
        tracing::info!("Shutting down telemetry");
        if let Some(provider) = self.tracer_provider {
            if let Err(err) = provider.shutdown() {
                tracing::warn!(error = %err, "Tracer provider shutdown failed");
            }
        }
        if let Some(provider) = self.meter_provider {
            if let Err(err) = provider.shutdown() {
                tracing::warn!(error = %err, "Meter provider shutdown failed");
            }
        }
    }
}

/// Install the global subscriber and any configured exporters
///
/// # Errors
///
/// Fails when an exporter cannot be built, the filter directive is invalid,
/// or a global subscriber is already installed.
pub fn init_observability(config: ObservabilityConfig) -> Result<TelemetryGuard> {
    let mut guard = TelemetryGuard::default();

    let tracer = if config.exports_traces() {
        let provider = init_tracer_provider(&config)?;
        use opentelemetry::trace::TracerProvider as _;
        let tracer = provider.tracer(config.service_name.clone());
        global::set_tracer_provider(provider.clone());
        guard.tracer_provider = Some(provider);
        Some(tracer)
    } else {
        None
    };

    if config.exports_metrics() {
        let provider = init_meter_provider(&config)?;
        global::set_meter_provider(provider.clone());
        guard.meter_provider = Some(provider);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::Observability(e.to_string()))?;

    let writer = config.log_target.make_writer();
    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_line_number(true)
            .json()
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .boxed(),
    };
    let otel_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::Observability(e.to_string()))?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = config.otlp_endpoint.as_deref().unwrap_or("none"),
        traces = guard.exports_traces(),
        metrics = guard.exports_metrics(),
        "Telemetry initialized"
    );

    Ok(guard)
}

fn init_tracer_provider(config: &ObservabilityConfig) -> Result<SdkTracerProvider> {
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let endpoint = config.otlp_endpoint.clone().unwrap_or_default();
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| Error::Observability(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build())
}

fn init_meter_provider(config: &ObservabilityConfig) -> Result<SdkMeterProvider> {
    let endpoint = config.otlp_endpoint.clone().unwrap_or_default();
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| Error::Observability(e.to_string()))?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(config.metrics_interval)
        .build();

    Ok(SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chaining() {
        let config = ObservabilityConfig::new("codegen")
            .with_endpoint("http://collector:4317")
            .with_version("2.0.0")
            .with_log_level("debug")
            .with_log_format(LogFormat::Json)
            .with_log_target(LogTarget::Stderr)
            .with_metrics(false);

        assert_eq!(config.service_name, "codegen");
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
        assert_eq!(config.service_version, "2.0.0");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_target, LogTarget::Stderr);
        assert!(config.exports_traces());
        assert!(!config.exports_metrics());
    }

    #[test]
    fn test_logs_default_to_stdout() {
        assert_eq!(ObservabilityConfig::new("local").log_target, LogTarget::Stdout);
    }

    #[test]
    fn test_no_endpoint_means_no_export() {
        let config = ObservabilityConfig::new("local").without_export();
        assert!(!config.exports_traces());
        assert!(!config.exports_metrics());
    }

    #[test]
    fn test_init_without_export() {
        let guard = ObservabilityConfig::new("test-local")
            .without_export()
            .with_log_target(LogTarget::Stderr)
            .with_log_level("warn")
            .init()
            .unwrap();
        assert!(!guard.exports_traces());
        assert!(!guard.exports_metrics());
        guard.shutdown();

        // A second global subscriber is refused rather than panicking
        let again = ObservabilityConfig::new("test-local").without_export().init();
        assert!(matches!(again, Err(Error::Observability(_))));
    }
}
