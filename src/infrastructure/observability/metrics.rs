//! Prometheus metrics definitions for fxdesk
//!
//! All metrics use the `fxdesk_` prefix. They are reporting only and never
//! feed back into control flow.

use prometheus::{CounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Recommendations generated, by draft source (model/heuristic)
    pub recommendations_generated_total: CounterVec,
    /// Acceptance attempts by outcome
    pub recommendations_accepted_total: CounterVec,
    /// Orders accepted by the broker, by kind (market/bracket)
    pub orders_submitted_total: CounterVec,
    /// Swallowed failures of best-effort writes, by step
    pub best_effort_failures_total: CounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let recommendations_generated_total = CounterVec::new(
            Opts::new(
                "fxdesk_recommendations_generated_total",
                "Recommendations generated by draft source",
            ),
            &["source"],
        )?;
        registry.register(Box::new(recommendations_generated_total.clone()))?;

        let recommendations_accepted_total = CounterVec::new(
            Opts::new(
                "fxdesk_recommendations_accepted_total",
                "Recommendation acceptance attempts by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(recommendations_accepted_total.clone()))?;

        let orders_submitted_total = CounterVec::new(
            Opts::new(
                "fxdesk_orders_submitted_total",
                "Orders accepted by the broker by kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(orders_submitted_total.clone()))?;

        let best_effort_failures_total = CounterVec::new(
            Opts::new(
                "fxdesk_best_effort_failures_total",
                "Best-effort writes that failed and were logged",
            ),
            &["step"],
        )?;
        registry.register(Box::new(best_effort_failures_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            recommendations_generated_total,
            recommendations_accepted_total,
            orders_submitted_total,
            best_effort_failures_total,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_generated(&self, source: &str) {
        self.recommendations_generated_total
            .with_label_values(&[source])
            .inc();
    }

    pub fn inc_accepted(&self, outcome: &str) {
        self.recommendations_accepted_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn inc_orders(&self, kind: &str) {
        self.orders_submitted_total.with_label_values(&[kind]).inc();
    }

    pub fn inc_best_effort_failure(&self, step: &str) {
        self.best_effort_failures_total
            .with_label_values(&[step])
            .inc();
    }

    pub fn best_effort_failures(&self, step: &str) -> f64 {
        self.best_effort_failures_total
            .with_label_values(&[step])
            .get()
    }
}
