// src/telemetry.rs
use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "fare_watcher=info,warn";

/// Install the global tracing subscriber. `RUST_LOG` wins over the default
/// filter; `json` switches to one JSON object per line.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

/// One-time metrics registration (so series carry help text).
pub fn describe_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fare_cycles_total", "Completed passes over the route/date matrix.");
        describe_counter!("fare_fetch_errors_total", "Fare API transport/status/decode errors.");
        describe_counter!("fare_offers_total", "Offers returned within price and duration limits.");
        describe_counter!("fare_notifications_total", "Fare alerts delivered.");
        describe_counter!(
            "fare_delivery_failures_total",
            "Fare alerts that failed to deliver (retried next cycle)."
        );
        describe_counter!("fare_cycle_panics_total", "Cycles aborted by a panic.");
        describe_gauge!("fare_ledger_entries", "Identities with a recorded alert price.");
        describe_gauge!("fare_last_cycle_ts", "Unix ts when the last cycle finished.");
    });
}

/// Serve Prometheus metrics on `addr`. Must be called inside a tokio runtime.
pub fn install_metrics_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("prometheus: install exporter")?;
    describe_metrics();
    tracing::info!(%addr, "metrics exporter listening");
    Ok(())
}
