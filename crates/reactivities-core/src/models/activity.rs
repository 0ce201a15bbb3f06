//! Activity model

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Categories offered by the activity form.
pub const CATEGORY_OPTIONS: [&str; 6] = ["drinks", "culture", "film", "food", "music", "travel"];

/// Identifier of an activity.
///
/// Ids arriving from routes are opaque strings; ids minted by the client
/// are random UUID v4 values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(String);

impl ActivityId {
    /// Generate a fresh, globally unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActivityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ActivityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An activity as stored by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(with = "wire_datetime")]
    pub date: NaiveDateTime,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub venue: String,
}

/// Body sent to the create and update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload {
    pub id: ActivityId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(with = "wire_datetime")]
    pub date: NaiveDateTime,
    pub city: String,
    pub venue: String,
}

/// Timestamps travel as `YYYY-MM-DDTHH:MM:SS` wall-clock values.
///
/// Offsets on incoming values are accepted and dropped, keeping the local
/// wall-clock reading the server stored.
mod wire_datetime {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
            return Ok(value.naive_local());
        }
        raw.parse::<NaiveDateTime>()
            .map_err(|error| serde::de::Error::custom(format!("invalid timestamp '{raw}': {error}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn generated_ids_are_unique_uuids() {
        let first = ActivityId::generate();
        let second = ActivityId::generate();
        assert_ne!(first, second);
        assert!(Uuid::parse_str(first.as_str()).is_ok());
    }

    #[test]
    fn activity_decodes_with_extra_fields_and_offset() {
        let raw = r#"{
            "id": "123",
            "title": "Run",
            "description": "Morning run",
            "category": "travel",
            "date": "2024-05-01T09:00:00Z",
            "city": "London",
            "venue": "Hyde Park",
            "isHost": true,
            "attendees": []
        }"#;
        let activity: Activity = serde_json::from_str(raw).unwrap();
        assert_eq!(activity.id, ActivityId::from("123"));
        assert_eq!(
            activity.date,
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn payload_serializes_camel_case_wall_clock() {
        let payload = ActivityPayload {
            id: ActivityId::from("123"),
            title: "Run".to_string(),
            description: "Morning run".to_string(),
            category: "travel".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            city: "London".to_string(),
            venue: "Hyde Park".to_string(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["id"], "123");
        assert_eq!(value["date"], "2024-05-01T09:00:00");
    }
}
