//! Prometheus recorder installation

use metrics::{describe_gauge, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

use crate::sink::{GATEWAY_COUNT, GATEWAY_TIME};

/// Errors setting up the metrics pipeline
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The process-global recorder could not be installed
    #[error("failed to install metrics recorder: {0}")]
    Install(#[from] BuildError),
}

/// Install the process-global Prometheus recorder and register the
/// gauge descriptions. The returned handle renders the exposition
/// text for the scrape endpoint.
pub fn install_recorder() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_gauge!(
        GATEWAY_TIME,
        Unit::Seconds,
        "Unix timestamp of the most recent observation per gateway and type"
    );
    describe_gauge!(
        GATEWAY_COUNT,
        Unit::Count,
        "Cumulative message count reported by the source per gateway and type"
    );

    tracing::debug!("metrics recorder installed");

    Ok(handle)
}
