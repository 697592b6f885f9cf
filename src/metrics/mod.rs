// Private module declaration
mod server;

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

pub use server::{health_handler, metrics_handler};

// ============================================================================
// Metrics Module - Prometheus metrics for order commands
// ============================================================================
//
// - order_commands_total{command, outcome}
// - order_command_duration_seconds{command}
//
// Scraped via GET /metrics
// ============================================================================

/// Outcome label values.
pub mod outcome {
    pub const ACCEPTED: &str = "accepted";
    pub const REJECTED: &str = "rejected";
    pub const NOT_FOUND: &str = "not_found";
    pub const CONFLICT: &str = "conflict";
    pub const ERROR: &str = "error";
}

pub struct Metrics {
    registry: Registry,
    commands_total: IntCounterVec,
    command_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let commands_total = IntCounterVec::new(
            Opts::new("order_commands_total", "Order commands handled, by outcome"),
            &["command", "outcome"],
        )?;
        registry.register(Box::new(commands_total.clone()))?;

        let command_duration = HistogramVec::new(
            HistogramOpts::new("order_command_duration_seconds", "Order command handling duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["command"],
        )?;
        registry.register(Box::new(command_duration.clone()))?;

        Ok(Self {
            registry,
            commands_total,
            command_duration,
        })
    }

    pub fn record_command(&self, command: &str, outcome: &str, duration_secs: f64) {
        self.commands_total.with_label_values(&[command, outcome]).inc();
        self.command_duration.with_label_values(&[command]).observe(duration_secs);
    }

    /// Prometheus text exposition of everything registered.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
