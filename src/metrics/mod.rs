// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers:
// - Orders placed and line items captured
// - Status transitions by (from, to)
// - Failed order requests by operation
// - Discount quotes by outcome and discounts created
// - Operation latency
//
// Registered with a private Registry and scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Order metrics
    pub orders_placed: IntCounter,
    pub order_line_items: IntCounter,
    pub order_status_transitions: IntCounterVec,
    pub order_requests_failed: IntCounterVec,

    // Discount metrics
    pub discount_quotes: IntCounterVec,
    pub discounts_created: IntCounter,

    // Latency
    pub operation_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_placed = IntCounter::new("orders_placed_total", "Total orders placed")?;
        registry.register(Box::new(orders_placed.clone()))?;

        let order_line_items = IntCounter::new("order_line_items_total", "Total order lines captured")?;
        registry.register(Box::new(order_line_items.clone()))?;

        let order_status_transitions = IntCounterVec::new(
            Opts::new("order_status_transitions_total", "Order status changes"),
            &["from", "to"],
        )?;
        registry.register(Box::new(order_status_transitions.clone()))?;

        let order_requests_failed = IntCounterVec::new(
            Opts::new("order_requests_failed_total", "Order requests that failed"),
            &["operation"],
        )?;
        registry.register(Box::new(order_requests_failed.clone()))?;

        let discount_quotes = IntCounterVec::new(
            Opts::new("discount_quotes_total", "Discount code validations by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(discount_quotes.clone()))?;

        let discounts_created = IntCounter::new("discounts_created_total", "Total discounts created")?;
        registry.register(Box::new(discounts_created.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("operation_duration_seconds", "Service operation duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            registry,
            orders_placed,
            order_line_items,
            order_status_transitions,
            order_requests_failed,
            discount_quotes,
            discounts_created,
            operation_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_placed(&self, line_count: usize) {
        self.orders_placed.inc();
        self.order_line_items.inc_by(line_count as u64);
    }

    pub fn record_status_transition(&self, from: &str, to: &str) {
        self.order_status_transitions.with_label_values(&[from, to]).inc();
    }

    pub fn record_order_failure(&self, operation: &str) {
        self.order_requests_failed.with_label_values(&[operation]).inc();
    }

    pub fn record_discount_quote(&self, outcome: &str) {
        self.discount_quotes.with_label_values(&[outcome]).inc();
    }

    pub fn record_discount_created(&self) {
        self.discounts_created.inc();
    }

    pub fn observe_duration(&self, operation: &str, duration_secs: f64) {
        self.operation_duration.with_label_values(&[operation]).observe(duration_secs);
    }
}
