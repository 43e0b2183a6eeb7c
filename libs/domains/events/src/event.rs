use crate::clock::Clock;
use crate::error::{EventError, Result};
use crate::models::{CreateEvent, Event, EventType};
use std::str::FromStr;
use std::sync::Arc;

/// Builds validated events stamped with the injected clock.
#[derive(Clone)]
pub struct EventFactory {
    clock: Arc<dyn Clock>,
}

impl EventFactory {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Validates the payload fail-fast in field order: type, adName, adPlacement.
    pub fn create(&self, payload: CreateEvent) -> Result<Event> {
        let event_type = payload
            .event_type
            .as_deref()
            .and_then(|t| EventType::from_str(t).ok())
            .ok_or_else(|| EventError::validation("Event type has to be one of: load, click"))?;

        let ad_name = non_empty(payload.ad_name)
            .ok_or_else(|| EventError::validation("Event has to have adName property"))?;

        let ad_placement = non_empty(payload.ad_placement)
            .ok_or_else(|| EventError::validation("Event has to have adPlacement property"))?;

        Ok(Event {
            event_type,
            ad_name,
            ad_placement,
            timestamp: self.clock.now(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
