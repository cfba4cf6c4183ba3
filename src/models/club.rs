// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Club records as published by the club list data source.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kind of club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ClubType {
    Academic,
    Service,
    Sports,
    Arts,
    Games,
}

/// When a club meets relative to the school day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MeetingTime {
    Before,
    After,
}

/// Day a club meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MeetingDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Weekend,
}

impl ClubType {
    pub fn as_str(self) -> &'static str {
        match self {
            ClubType::Academic => "Academic",
            ClubType::Service => "Service",
            ClubType::Sports => "Sports",
            ClubType::Arts => "Arts",
            ClubType::Games => "Games",
        }
    }
}

impl MeetingTime {
    pub fn as_str(self) -> &'static str {
        match self {
            MeetingTime::Before => "Before",
            MeetingTime::After => "After",
        }
    }
}

impl MeetingDay {
    pub fn as_str(self) -> &'static str {
        match self {
            MeetingDay::Monday => "Monday",
            MeetingDay::Tuesday => "Tuesday",
            MeetingDay::Wednesday => "Wednesday",
            MeetingDay::Thursday => "Thursday",
            MeetingDay::Friday => "Friday",
            MeetingDay::Weekend => "Weekend",
        }
    }
}

impl fmt::Display for ClubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MeetingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MeetingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One club from the published list.
///
/// `club` is the display name and the identity key within a load. Every other
/// field may be missing in the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClubRecord {
    pub club: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub club_type: Option<ClubType>,
    #[serde(rename = "Time", default, skip_serializing_if = "Option::is_none")]
    pub time: Option<MeetingTime>,
    #[serde(rename = "Day", default, skip_serializing_if = "Option::is_none")]
    pub day: Option<MeetingDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ClubRecord {
    /// Minimal record with only a name, used by tests and fixtures.
    pub fn named(club: impl Into<String>) -> Self {
        Self {
            club: club.into(),
            staff: None,
            email: None,
            club_type: None,
            time: None,
            day: None,
            description: None,
        }
    }

    /// True when the display name starts with an ASCII digit.
    pub fn starts_with_digit(&self) -> bool {
        self.club.chars().next().is_some_and(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_source_shape() {
        let json = r#"{
            "club": "Ski Club",
            "staff": "Ms. Frost",
            "email": "frost@school.org",
            "Type": "Sports",
            "Time": "After",
            "Day": "Weekend"
        }"#;

        let record: ClubRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.club, "Ski Club");
        assert_eq!(record.club_type, Some(ClubType::Sports));
        assert_eq!(record.time, Some(MeetingTime::After));
        assert_eq!(record.day, Some(MeetingDay::Weekend));
        assert_eq!(record.description, None);
    }

    #[test]
    fn test_serialize_uses_source_field_names() {
        let mut record = ClubRecord::named("Chess");
        record.club_type = Some(ClubType::Games);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Type"], "Games");
        assert!(value.get("Time").is_none());
    }

    #[test]
    fn test_starts_with_digit() {
        assert!(ClubRecord::named("4-H Club").starts_with_digit());
        assert!(!ClubRecord::named("Art Club").starts_with_digit());
        assert!(!ClubRecord::named("").starts_with_digit());
    }
}
