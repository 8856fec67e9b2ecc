//! Prometheus metrics for the storefront.
//!
//! All metrics follow the naming convention: `sf_<area>_<metric>_<unit>`.
//! They are fed by the runtime's analytics subscriber, never by the core
//! components directly.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Wallet session lifecycle events
    pub static ref WALLET_SESSIONS: CounterVec = CounterVec::new(
        Opts::new("sf_wallet_sessions_total", "Wallet session lifecycle events"),
        &["event"]  // connected, disconnected, account_changed
    ).expect("metric creation failed");

    /// Purchase attempts by outcome
    pub static ref PURCHASES: CounterVec = CounterVec::new(
        Opts::new("sf_purchases_total", "Purchase attempts by outcome"),
        &["outcome"]  // started, completed, failed
    ).expect("metric creation failed");

    /// Time from payment/started to the terminal event
    pub static ref PURCHASE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "sf_purchase_duration_seconds",
            "Time from submission to terminal outcome"
        ).buckets(exponential_buckets(0.01, 2.0, 12).expect("bucket layout"))
    ).expect("metric creation failed");

    /// Events seen on the bus
    pub static ref BUS_EVENTS: CounterVec = CounterVec::new(
        Opts::new("sf_bus_events_total", "Events published on the storefront bus"),
        &["topic"]
    ).expect("metric creation failed");

    /// Methods in the registry cache after the last refresh
    pub static ref PAYMENT_METHODS_CACHED: Gauge = Gauge::new(
        "sf_payment_methods_cached",
        "Payment methods in the registry cache"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(WALLET_SESSIONS.clone()),
        Box::new(PURCHASES.clone()),
        Box::new(PURCHASE_DURATION.clone()),
        Box::new(BUS_EVENTS.clone()),
        Box::new(PAYMENT_METHODS_CACHED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
