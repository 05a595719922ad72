//! Scanner metrics

use crate::{config::MonitoringConfig, ArbitrageError, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// Completed scans
pub const SCANS_TOTAL: &str = "arb_scans_total";
/// Events run through the engine
pub const EVENTS_EVALUATED_TOTAL: &str = "arb_events_evaluated_total";
/// Opportunities that passed the ROI filter
pub const OPPORTUNITIES_TOTAL: &str = "arb_opportunities_total";
/// Provider fetches that failed after all retries
pub const PROVIDER_ERRORS_TOTAL: &str = "arb_provider_errors_total";
/// Best ROI seen in the latest scan
pub const BEST_ROI_PERCENT: &str = "arb_best_roi_percent";

/// Install the Prometheus exporter when monitoring is enabled.
///
/// Must be called from inside a tokio runtime.
pub fn install_exporter(config: &MonitoringConfig) -> Result<()> {
    if !config.enable_metrics {
        return Ok(());
    }

    let addr: SocketAddr = config.metrics_listen_addr.parse().map_err(|e| {
        ArbitrageError::Config(format!(
            "Invalid metrics listen address {}: {}",
            config.metrics_listen_addr, e
        ))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| ArbitrageError::Config(format!("Failed to install metrics exporter: {}", e)))?;

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
