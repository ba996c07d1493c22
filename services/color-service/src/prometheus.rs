//! Prometheus metrics
//!
//! A single global recorder is installed on first use; every later
//! `Metrics::init()` shares the same handle. Process metrics follow the
//! standard Prometheus process collector names and are sampled on render.

use anyhow::{Context, Result};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use metrics_process::Collector;
use once_cell::sync::OnceCell;

pub const HTTP_REQUESTS_TOTAL: &str = "color_service_http_requests_total";
pub const COLORS_PICKED_TOTAL: &str = "color_service_colors_picked_total";

static RECORDER: OnceCell<PrometheusHandle> = OnceCell::new();

/// Handle used by `/metrics` to render the exposition text
#[derive(Clone)]
pub struct Metrics {
    handle: PrometheusHandle,
    process: Collector,
}

impl Metrics {
    /// Install the global recorder (once) and return a handle to it
    pub fn init() -> Result<Self> {
        let process = Collector::default();
        let handle = RECORDER
            .get_or_try_init(|| -> Result<_> {
                let handle = PrometheusBuilder::new()
                    .install_recorder()
                    .context("Failed to install Prometheus recorder")?;
                describe_counter!(HTTP_REQUESTS_TOTAL, "HTTP requests served under /api");
                describe_counter!(COLORS_PICKED_TOTAL, "Colors picked and stored");
                process.describe();
                Ok(handle)
            })?
            .clone();

        Ok(Self { handle, process })
    }

    /// Prometheus text exposition of every registered metric
    pub fn render(&self) -> String {
        self.process.collect();
        self.handle.render()
    }
}
