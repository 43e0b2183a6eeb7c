//! MongoDB implementation of EventRepository

use crate::error::{EventError, REPORT_FAILED, Result, SAVE_EVENT_FAILED};
use crate::models::{Event, EventType, ReportCriteria, ReportRow, ReportWindow};
use crate::repository::EventRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, Document, doc};
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Collection holding the append-only event log
pub const EVENTS_COLLECTION: &str = "events";

/// Stored shape of an [`Event`]. The timestamp is a native BSON date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDocument {
    #[serde(rename = "type")]
    event_type: EventType,
    ad_name: String,
    ad_placement: String,
    timestamp: bson::DateTime,
}

impl From<&Event> for EventDocument {
    fn from(event: &Event) -> Self {
        Self {
            event_type: event.event_type,
            ad_name: event.ad_name.clone(),
            ad_placement: event.ad_placement.clone(),
            timestamp: to_bson_datetime(event.timestamp),
        }
    }
}

impl From<EventDocument> for Event {
    fn from(document: EventDocument) -> Self {
        Self {
            event_type: document.event_type,
            ad_name: document.ad_name,
            ad_placement: document.ad_placement,
            timestamp: from_bson_datetime(document.timestamp),
        }
    }
}

fn to_bson_datetime(instant: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(instant.timestamp_millis())
}

fn from_bson_datetime(instant: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// MongoDB-based event repository
#[derive(Clone)]
pub struct MongoEventRepository {
    collection: Collection<EventDocument>,
}

impl MongoEventRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(EVENTS_COLLECTION),
        }
    }

    /// Create indexes backing the report query
    pub async fn create_indexes(&self) -> mongodb::error::Result<()> {
        let indexes = vec![
            IndexModel::builder().keys(doc! { "timestamp": 1 }).build(),
            IndexModel::builder()
                .keys(doc! { "adName": 1, "timestamp": 1 })
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    /// Select the window, group by ad, count each kind, sort by ad name.
    fn report_pipeline(window: &ReportWindow) -> Vec<Document> {
        let count_of = |kind: EventType| {
            let kind: &str = kind.as_ref();
            doc! { "$sum": { "$cond": [{ "$eq": ["$type", kind] }, 1, 0] } }
        };

        vec![
            doc! {
                "$match": {
                    "timestamp": {
                        "$gte": to_bson_datetime(window.start),
                        "$lt": to_bson_datetime(window.end),
                    }
                }
            },
            doc! {
                "$group": {
                    "_id": "$adName",
                    "loads": count_of(EventType::Load),
                    "clicks": count_of(EventType::Click),
                }
            },
            doc! { "$project": { "_id": 0, "adName": "$_id", "loads": 1, "clicks": 1 } },
            doc! { "$sort": { "adName": 1 } },
        ]
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    #[instrument(skip(self, event), fields(ad_name = %event.ad_name, event_type = %event.event_type))]
    async fn save_event(&self, event: &Event) -> Result<()> {
        self.collection
            .insert_one(EventDocument::from(event))
            .await
            .map_err(|e| EventError::persistence(e, SAVE_EVENT_FAILED))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_report(&self, criteria: Option<ReportCriteria>) -> Result<Vec<ReportRow>> {
        let window = ReportWindow::from_criteria(criteria)?;

        let cursor = self
            .collection
            .aggregate(Self::report_pipeline(&window))
            .with_type::<ReportRow>()
            .await
            .map_err(|e| EventError::persistence(e, REPORT_FAILED))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| EventError::persistence(e, REPORT_FAILED))
    }
}
