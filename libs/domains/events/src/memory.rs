//! In-memory implementation of EventRepository

use crate::error::Result;
use crate::models::{Event, EventType, ReportCriteria, ReportRow, ReportWindow};
use crate::repository::EventRepository;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local event log, for tests and store-less runs.
#[derive(Clone, Default)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<Vec<Event>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn save_event(&self, event: &Event) -> Result<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn get_report(&self, criteria: Option<ReportCriteria>) -> Result<Vec<ReportRow>> {
        let window = ReportWindow::from_criteria(criteria)?;
        let events = self.events.read().await;

        let mut counts: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
        for event in events.iter().filter(|e| window.contains(e.timestamp)) {
            let (loads, clicks) = counts.entry(event.ad_name.as_str()).or_default();
            match event.event_type {
                EventType::Load => *loads += 1,
                EventType::Click => *clicks += 1,
            }
        }

        Ok(counts
            .into_iter()
            .map(|(ad_name, (loads, clicks))| ReportRow {
                ad_name: ad_name.to_string(),
                loads,
                clicks,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn event(kind: EventType, ad: &str, timestamp: DateTime<Utc>) -> Event {
        Event {
            event_type: kind,
            ad_name: ad.to_string(),
            ad_placement: format!("{ad}-placement"),
            timestamp,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_report_groups_counts_and_sorts() {
        let repo = InMemoryEventRepository::new();
        let events = [
            event(EventType::Click, "some-ad", noon()),
            event(EventType::Load, "another-ad", noon()),
            event(EventType::Click, "some-ad", noon()),
            event(EventType::Load, "another-ad", noon()),
            event(EventType::Load, "some-ad", noon()),
            event(EventType::Click, "some-ad", noon() - Duration::days(1)),
            event(EventType::Click, "some-ad", noon() + Duration::days(1)),
        ];
        for e in &events {
            repo.save_event(e).await.unwrap();
        }
        assert_eq!(repo.len().await, 7);

        let report = repo
            .get_report(Some(ReportCriteria::for_day(day())))
            .await
            .unwrap();

        assert_eq!(
            report,
            vec![
                ReportRow {
                    ad_name: "another-ad".into(),
                    loads: 2,
                    clicks: 0
                },
                ReportRow {
                    ad_name: "some-ad".into(),
                    loads: 1,
                    clicks: 2
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_report_is_repeatable_and_leaves_events_untouched() {
        let repo = InMemoryEventRepository::new();
        for (kind, ad) in [
            (EventType::Load, "zebra"),
            (EventType::Click, "alpha"),
            (EventType::Load, "Mango"),
            (EventType::Click, "zebra"),
        ] {
            repo.save_event(&event(kind, ad, noon())).await.unwrap();
        }

        let criteria = Some(ReportCriteria::for_day(day()));
        let first = repo.get_report(criteria).await.unwrap();
        let second = repo.get_report(criteria).await.unwrap();

        assert_eq!(first, second);
        let names: Vec<_> = first.iter().map(|r| r.ad_name.as_str()).collect();
        assert_eq!(names, ["Mango", "alpha", "zebra"]);
        assert_eq!(repo.len().await, 4);
    }

    #[tokio::test]
    async fn test_midnight_belongs_to_next_day() {
        let repo = InMemoryEventRepository::new();
        let midnight = Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap();
        repo.save_event(&event(EventType::Load, "edge-ad", midnight))
            .await
            .unwrap();

        let today = repo
            .get_report(Some(ReportCriteria::for_day(day())))
            .await
            .unwrap();
        assert!(today.is_empty());

        let tomorrow = repo
            .get_report(Some(ReportCriteria::for_day(day().succ_opt().unwrap())))
            .await
            .unwrap();
        assert_eq!(tomorrow.len(), 1);
        assert_eq!(tomorrow[0].loads, 1);
    }

    #[tokio::test]
    async fn test_empty_day_and_missing_criteria() {
        let repo = InMemoryEventRepository::new();
        assert!(repo.is_empty().await);

        let report = repo
            .get_report(Some(ReportCriteria::for_day(day())))
            .await
            .unwrap();
        assert!(report.is_empty());

        assert!(repo.get_report(None).await.unwrap_err().is_validation());
    }
}
