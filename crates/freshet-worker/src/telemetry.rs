//! Logging and metrics setup.

use freshet_jobs::register_job_metrics;
use freshet_store::register_store_metrics;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber.
///
/// Filters come from `RUST_LOG` (default `info`). Logs go to stderr so
/// command output on stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Installs the Prometheus recorder and describes every Freshet metric.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    // Buckets en segundos: fetches van de milisegundos a minutos
    let handle = PrometheusBuilder::new()
        .set_buckets(&[
            0.0001, // 100 microsegundos
            0.001,  // 1 milisegundo
            0.005,
            0.01,
            0.05,
            0.1,
            0.5,
            1.0,
            5.0,
            10.0,
            30.0,
            60.0,
            180.0, // refresh timeout mas largo
        ])?
        .install_recorder()?;

    register_store_metrics();
    register_job_metrics();

    info!("Metrics system initialized");
    Ok(handle)
}
