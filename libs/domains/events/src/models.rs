//! Ad event domain models

use crate::error::{EventError, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Kind of ad interaction
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventType {
    /// The ad was rendered on a page
    Load,
    /// The ad was clicked
    Click,
}

/// One observed ad interaction. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Advertisement identifier
    pub ad_name: String,

    /// Where the ad was shown
    pub ad_placement: String,

    /// Capture time, assigned at ingestion
    #[serde(with = "iso8601_millis")]
    #[schema(value_type = String, format = DateTime, example = "2024-03-05T10:15:00.000Z")]
    pub timestamp: DateTime<Utc>,
}

/// Inbound event payload.
///
/// Fields are optional so that missing ones are reported by the event factory with
/// a precise message instead of a generic deserialization error. A field holding a
/// non-string value reads as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    /// `load` or `click`
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    #[schema(example = "click")]
    pub event_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schema(example = "summer-sale")]
    pub ad_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schema(example = "sidebar")]
    pub ad_placement: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<Field>::deserialize(deserializer)? {
        Some(Field::Text(text)) => Some(text),
        Some(Field::Other(_)) | None => None,
    })
}

impl CreateEvent {
    pub fn new(
        event_type: impl Into<String>,
        ad_name: impl Into<String>,
        ad_placement: impl Into<String>,
    ) -> Self {
        Self {
            event_type: Some(event_type.into()),
            ad_name: Some(ad_name.into()),
            ad_placement: Some(ad_placement.into()),
        }
    }
}

/// Scope of a report query: a calendar day, interpreted in UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportCriteria {
    pub day: Option<NaiveDate>,
}

impl ReportCriteria {
    pub fn for_day(day: NaiveDate) -> Self {
        Self { day: Some(day) }
    }
}

/// Half-open UTC interval `[start, end)` covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    pub fn for_day(day: NaiveDate) -> Self {
        let start = day.and_time(NaiveTime::MIN).and_utc();
        // Days::new(1) only fails at the end of chrono's representable range.
        let end = start
            .checked_add_days(Days::new(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start, end }
    }

    /// Validates criteria and derives the window.
    pub fn from_criteria(criteria: Option<ReportCriteria>) -> Result<Self> {
        let criteria = criteria
            .ok_or_else(|| EventError::validation("Report criteria are required"))?;
        let day = criteria
            .day
            .ok_or_else(|| EventError::validation("Report criteria must contain a day"))?;
        Ok(Self::for_day(day))
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Per-advertisement counts within a report window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub ad_name: String,
    pub loads: u64,
    pub clicks: u64,
}

/// Daily report response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Report {
    /// Rows sorted ascending by `adName`
    pub report: Vec<ReportRow>,
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-03-05T10:15:00.000Z`.
mod iso8601_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        instant: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_event_serializes_with_wire_names() {
        let event = Event {
            event_type: EventType::Click,
            ad_name: "some-ad".to_string(),
            ad_placement: "some-placement".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 10, 15, 0).unwrap(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "click",
                "adName": "some-ad",
                "adPlacement": "some-placement",
                "timestamp": "2024-03-05T10:15:00.000Z"
            })
        );
    }

    #[test]
    fn test_create_event_accepts_partial_payload() {
        let payload: CreateEvent = serde_json::from_str(r#"{"adName":"x"}"#).unwrap();
        assert_eq!(payload.event_type, None);
        assert_eq!(payload.ad_name.as_deref(), Some("x"));
        assert_eq!(payload.ad_placement, None);
    }

    #[test]
    fn test_create_event_non_string_fields_read_as_absent() {
        let payload: CreateEvent =
            serde_json::from_str(r#"{"type":7,"adName":{"a":1},"adPlacement":["x"]}"#).unwrap();
        assert_eq!(payload.event_type, None);
        assert_eq!(payload.ad_name, None);
        assert_eq!(payload.ad_placement, None);

        let payload: CreateEvent =
            serde_json::from_str(r#"{"type":"hover","adName":5,"adPlacement":null}"#).unwrap();
        assert_eq!(payload.event_type.as_deref(), Some("hover"));
        assert_eq!(payload.ad_name, None);
        assert_eq!(payload.ad_placement, None);
    }

    #[test]
    fn test_window_is_half_open_utc_day() {
        let window = ReportWindow::for_day(day(2024, 3, 5));
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap());

        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
        assert!(window.contains(window.end - chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn test_adjacent_windows_partition_midnight() {
        let today = ReportWindow::for_day(day(2024, 2, 29));
        let tomorrow = ReportWindow::for_day(day(2024, 3, 1));
        assert_eq!(today.end, tomorrow.start);

        let midnight = tomorrow.start;
        assert!(!today.contains(midnight));
        assert!(tomorrow.contains(midnight));
    }

    #[test]
    fn test_window_requires_criteria_and_day() {
        let err = ReportWindow::from_criteria(None).unwrap_err();
        assert_eq!(err.to_string(), "Report criteria are required");

        let err = ReportWindow::from_criteria(Some(ReportCriteria::default())).unwrap_err();
        assert_eq!(err.to_string(), "Report criteria must contain a day");

        let window = ReportWindow::from_criteria(Some(ReportCriteria::for_day(day(2024, 1, 1))));
        assert!(window.is_ok());
    }
}
