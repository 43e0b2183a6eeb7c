//! Metrics for ad event ingestion and reporting.

use metrics::{counter, histogram};
use std::time::Duration;

/// Ad tracking metrics recorder
pub struct AdMetrics;

impl AdMetrics {
    /// Record one accepted event of the given kind (`load` or `click`)
    pub fn record_event_ingested(event_type: &str) {
        counter!("ad_events_ingested_total", "type" => event_type.to_string()).increment(1);
    }

    /// Record an event rejected before persistence
    pub fn record_event_rejected(reason: &'static str) {
        counter!("ad_events_rejected_total", "reason" => reason).increment(1);
    }

    /// Record a generated daily report
    pub fn record_report_generated(rows: usize, duration: Duration) {
        counter!("ad_reports_generated_total").increment(1);
        histogram!("ad_report_duration_seconds").record(duration.as_secs_f64());

        tracing::debug!(
            rows = rows,
            duration_ms = duration.as_millis() as u64,
            "Generated ad report"
        );
    }
}
