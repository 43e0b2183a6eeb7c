//! Event repository trait

use crate::error::Result;
use crate::models::{Event, ReportCriteria, ReportRow};
use async_trait::async_trait;

/// Storage contract for ad events.
///
/// Implementations hold no per-call state beyond their store handle.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persist one event. Store failures become `EventError::Persistence`.
    async fn save_event(&self, event: &Event) -> Result<()>;

    /// Per-ad load and click counts for the criteria's UTC day, sorted by `adName`.
    ///
    /// Missing criteria or a missing day is a validation error. A day without events
    /// yields an empty list.
    async fn get_report(&self, criteria: Option<ReportCriteria>) -> Result<Vec<ReportRow>>;
}
