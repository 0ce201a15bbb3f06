//! Editable activity fields, validation and the date/time merge.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};
use crate::models::{Activity, ActivityId, ActivityPayload, CATEGORY_OPTIONS};
use crate::util::is_blank;

const MIN_DESCRIPTION_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Description,
    Category,
    Date,
    Time,
    City,
    Venue,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Category => "category",
            Self::Date => "date",
            Self::Time => "time",
            Self::City => "city",
            Self::Venue => "venue",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validation messages keyed by field.
pub type FieldErrors = BTreeMap<Field, &'static str>;

/// The activity as the form edits it: date and time are separate inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFormValues {
    pub title: String,
    pub description: String,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub city: String,
    pub venue: String,
}

impl From<&Activity> for ActivityFormValues {
    fn from(activity: &Activity) -> Self {
        let (date, time) = split_date_and_time(activity.date);
        Self {
            title: activity.title.clone(),
            description: activity.description.clone(),
            category: activity.category.clone(),
            date: Some(date),
            time: Some(time),
            city: activity.city.clone(),
            venue: activity.venue.clone(),
        }
    }
}

impl ActivityFormValues {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if is_blank(&self.title) {
            errors.insert(Field::Title, "The event title is required");
        }
        if is_blank(&self.category) {
            errors.insert(Field::Category, "The event category is required");
        }
        if is_blank(&self.description) {
            errors.insert(Field::Description, "The event description is required");
        } else if self.description.chars().count() < MIN_DESCRIPTION_CHARS {
            errors.insert(
                Field::Description,
                "Description needs to be at least 5 characters",
            );
        }
        if is_blank(&self.city) {
            errors.insert(Field::City, "The event city is required");
        }
        if is_blank(&self.venue) {
            errors.insert(Field::Venue, "The event venue is required");
        }
        if self.date.is_none() {
            errors.insert(Field::Date, "The event date is required");
        }
        if self.time.is_none() {
            errors.insert(Field::Time, "The event time is required");
        }
        errors
    }

    /// Validation for a new activity: the category must also be one of
    /// the offered options. Existing activities keep whatever category the
    /// server holds.
    pub fn validate_new(&self) -> FieldErrors {
        let mut errors = self.validate();
        if !errors.contains_key(&Field::Category)
            && !CATEGORY_OPTIONS.contains(&self.category.trim())
        {
            errors.insert(Field::Category, "The event category is not a known category");
        }
        errors
    }

    /// Build the outgoing payload, merging date and time into one value.
    pub fn to_payload(&self, id: ActivityId) -> std::result::Result<ActivityPayload, FieldErrors> {
        let errors = self.validate();
        let (Some(date), Some(time), true) = (self.date, self.time, errors.is_empty()) else {
            return Err(errors);
        };
        Ok(ActivityPayload {
            id,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.trim().to_string(),
            date: combine_date_and_time(date, time),
            city: self.city.clone(),
            venue: self.venue.clone(),
        })
    }
}

/// Merge a calendar date and a time of day into one wall-clock timestamp.
pub fn combine_date_and_time(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// Inverse of [`combine_date_and_time`], used when populating the form.
pub fn split_date_and_time(value: NaiveDateTime) -> (NaiveDate, NaiveTime) {
    (value.date(), value.time())
}

/// Parse a `YYYY-MM-DD` date input.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|error| Error::InvalidInput(format!("invalid date '{}': {error}", raw.trim())))
}

/// Parse an `HH:MM` or `HH:MM:SS` time input.
pub fn parse_time(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|error| Error::InvalidInput(format!("invalid time '{raw}': {error}")))
}
