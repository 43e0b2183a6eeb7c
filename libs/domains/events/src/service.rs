//! Event service layer

use crate::clock::Clock;
use crate::error::{EventError, Result};
use crate::event::EventFactory;
use crate::models::{CreateEvent, Event, ReportCriteria, ReportRow};
use crate::repository::EventRepository;
use observability::AdMetrics;
use std::time::Instant;
use tracing::{debug, instrument};

/// Coordinates event creation, storage and reporting
pub struct EventService<R: EventRepository> {
    repository: R,
    factory: EventFactory,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: R, clock: impl Clock + 'static) -> Self {
        Self {
            repository,
            factory: EventFactory::new(clock),
        }
    }

    /// Validate, stamp and store a new event
    #[instrument(skip(self, payload))]
    pub async fn record(&self, payload: CreateEvent) -> Result<Event> {
        let event = self.factory.create(payload).inspect_err(|e| {
            if let EventError::Validation(_) = e {
                AdMetrics::record_event_rejected("validation");
            }
        })?;

        self.repository.save_event(&event).await?;
        AdMetrics::record_event_ingested(event.event_type.as_ref());
        debug!(ad_name = %event.ad_name, event_type = %event.event_type, "Event stored");

        Ok(event)
    }

    /// Per-ad counts for one UTC day
    #[instrument(skip(self))]
    pub async fn report(&self, criteria: Option<ReportCriteria>) -> Result<Vec<ReportRow>> {
        let started = Instant::now();
        let rows = self.repository.get_report(criteria).await?;
        AdMetrics::record_report_generated(rows.len(), started.elapsed());
        Ok(rows)
    }
}
