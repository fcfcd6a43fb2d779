//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod logging;
mod metrics;

pub use self::metrics::{
    increment, record_latency, record_skip, CounterMetric, LatencyMetric, SkipReason,
};
pub use logging::{init_logging, LogFormat};

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Guard held for the lifetime of the process
pub struct TelemetryGuard {
    /// Address the Prometheus exporter listens on, if started
    pub metrics_addr: Option<SocketAddr>,
}

/// Initialize all telemetry subsystems
///
/// Must be called from within a tokio runtime when a metrics port is set.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, config.log_format)?;

    let metrics_addr = match config.metrics_port {
        Some(port) => {
            let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
            PrometheusBuilder::new()
                .with_http_listener(addr)
                .install()
                .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
            tracing::info!(%addr, "Prometheus exporter listening");
            Some(addr)
        }
        None => None,
    };

    Ok(TelemetryGuard { metrics_addr })
}
