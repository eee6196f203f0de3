//! # Telemetry Features
//!
//! Console logging through `tracing_subscriber::fmt` is always on. The
//! filter defaults to `info` and can be overridden with `RUST_LOG`.
//!
//! ## Feature matrix
//!
//! - `otel`: bridges `tracing` spans to an OpenTelemetry tracer provider.
//! - `stdout`: exports spans with the OpenTelemetry stdout exporter.
//! - `otlp`: exports spans over OTLP/gRPC. The endpoint is read from the
//!   standard `OTEL_EXPORTER_OTLP_ENDPOINT` variable.
//!
//! ## Example usage
//!
//! ```bash
//! cargo run --features stdout
//! RUST_LOG=geoloc_server=debug,tower_http=debug cargo run
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "otel")]
use opentelemetry::{KeyValue, trace::TracerProvider};
#[cfg(feature = "otel")]
use opentelemetry_sdk::{Resource, propagation::TraceContextPropagator, trace as sdktrace};

#[cfg(feature = "otel")]
const SERVICE_NAME: &str = "geoloc";

pub struct TelemetryProviders {
    #[cfg(feature = "otel")]
    pub tracer_provider: sdktrace::SdkTracerProvider,
}

impl TelemetryProviders {
    /// Flushes and shuts down exporters. Called once on shutdown.
    pub fn shutdown(self) {
        #[cfg(feature = "otel")]
        {
            if let Err(err) = self.tracer_provider.force_flush() {
                eprintln!("Error flushing traces: {err:#?}");
            }
            if let Err(err) = self.tracer_provider.shutdown() {
                eprintln!("Error shutting down tracer: {err:#?}");
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "otel")]
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    #[cfg(feature = "otel")]
    let tracer_provider = init_tracer()?;

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        );

    #[cfg(feature = "otel")]
    let registry = {
        opentelemetry::global::set_tracer_provider(tracer_provider.clone());
        registry.with(
            tracing_opentelemetry::layer()
                .with_tracer(tracer_provider.tracer(SERVICE_NAME))
                .with_error_records_to_exceptions(true),
        )
    };

    registry.try_init()?;

    Ok(TelemetryProviders {
        #[cfg(feature = "otel")]
        tracer_provider,
    })
}

#[cfg(feature = "otel")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build()
}

#[cfg(feature = "otel")]
fn init_tracer() -> anyhow::Result<sdktrace::SdkTracerProvider> {
    let builder = sdktrace::SdkTracerProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = builder.with_simple_exporter(opentelemetry_stdout::SpanExporter::default());

    #[cfg(feature = "otlp")]
    let builder = {
        use anyhow::Context;

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .build()
            .context("failed to build span exporter")?;
        builder.with_batch_exporter(exporter)
    };

    Ok(builder.build())
}
