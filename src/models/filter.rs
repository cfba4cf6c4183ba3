// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Filter facets and the checkbox identifiers that persist them.

use crate::models::club::{ClubRecord, ClubType, MeetingDay, MeetingTime};
use serde::Serialize;
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single selectable facet value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetValue {
    Type(ClubType),
    Time(MeetingTime),
    Day(MeetingDay),
}

/// Checkbox identifiers in display order, with the facet value each controls.
pub const CHECKBOXES: [(&str, FacetValue); 13] = [
    ("checkboxAcademic", FacetValue::Type(ClubType::Academic)),
    ("checkboxService", FacetValue::Type(ClubType::Service)),
    ("checkboxSports", FacetValue::Type(ClubType::Sports)),
    ("checkboxArt", FacetValue::Type(ClubType::Arts)),
    ("checkboxGames", FacetValue::Type(ClubType::Games)),
    ("checkboxBefore", FacetValue::Time(MeetingTime::Before)),
    ("checkboxAfter", FacetValue::Time(MeetingTime::After)),
    ("checkboxMonday", FacetValue::Day(MeetingDay::Monday)),
    ("checkboxTuesday", FacetValue::Day(MeetingDay::Tuesday)),
    ("checkboxWednesday", FacetValue::Day(MeetingDay::Wednesday)),
    ("checkboxThursday", FacetValue::Day(MeetingDay::Thursday)),
    ("checkboxFriday", FacetValue::Day(MeetingDay::Friday)),
    ("checkboxWeekend", FacetValue::Day(MeetingDay::Weekend)),
];

impl FacetValue {
    /// Look up the facet value for a checkbox identifier.
    pub fn from_checkbox(id: &str) -> Option<FacetValue> {
        CHECKBOXES
            .iter()
            .find(|(checkbox, _)| *checkbox == id)
            .map(|(_, value)| *value)
    }

    pub fn label(self) -> &'static str {
        match self {
            FacetValue::Type(t) => t.as_str(),
            FacetValue::Time(t) => t.as_str(),
            FacetValue::Day(d) => d.as_str(),
        }
    }
}

/// Selected Types, Times and Days.
///
/// An empty selection places no restriction on that facet. Facets combine
/// with AND; selections within one facet combine with OR.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FilterFacets {
    pub types: BTreeSet<ClubType>,
    pub times: BTreeSet<MeetingTime>,
    pub days: BTreeSet<MeetingDay>,
}

impl FilterFacets {
    /// Build facets from persisted checkbox states. Unset checkboxes are
    /// unchecked.
    pub fn from_checkbox_states<F>(mut state: F) -> Self
    where
        F: FnMut(&str) -> Option<bool>,
    {
        let mut facets = Self::default();
        for (id, value) in CHECKBOXES {
            if state(id).unwrap_or(false) {
                facets.set(value, true);
            }
        }
        facets
    }

    pub fn set(&mut self, value: FacetValue, checked: bool) {
        match (value, checked) {
            (FacetValue::Type(t), true) => {
                self.types.insert(t);
            }
            (FacetValue::Type(t), false) => {
                self.types.remove(&t);
            }
            (FacetValue::Time(t), true) => {
                self.times.insert(t);
            }
            (FacetValue::Time(t), false) => {
                self.times.remove(&t);
            }
            (FacetValue::Day(d), true) => {
                self.days.insert(d);
            }
            (FacetValue::Day(d), false) => {
                self.days.remove(&d);
            }
        }
    }

    pub fn is_checked(&self, value: FacetValue) -> bool {
        match value {
            FacetValue::Type(t) => self.types.contains(&t),
            FacetValue::Time(t) => self.times.contains(&t),
            FacetValue::Day(d) => self.days.contains(&d),
        }
    }

    /// True when at least one facet has a selection.
    pub fn is_active(&self) -> bool {
        !self.types.is_empty() || !self.times.is_empty() || !self.days.is_empty()
    }

    /// Whether a club passes every active facet. A club missing a field never
    /// passes a facet that restricts it.
    pub fn matches(&self, club: &ClubRecord) -> bool {
        fn facet_allows<T: Ord>(selected: &BTreeSet<T>, value: Option<&T>) -> bool {
            selected.is_empty() || value.is_some_and(|v| selected.contains(v))
        }

        facet_allows(&self.types, club.club_type.as_ref())
            && facet_allows(&self.times, club.time.as_ref())
            && facet_allows(&self.days, club.day.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn club(name: &str, club_type: ClubType, day: MeetingDay) -> ClubRecord {
        let mut record = ClubRecord::named(name);
        record.club_type = Some(club_type);
        record.day = Some(day);
        record.time = Some(MeetingTime::After);
        record
    }

    #[test]
    fn test_empty_facets_match_everything() {
        let facets = FilterFacets::default();
        assert!(!facets.is_active());
        assert!(facets.matches(&ClubRecord::named("Anything")));
    }

    #[test]
    fn test_or_within_and_across() {
        let mut facets = FilterFacets::default();
        facets.set(FacetValue::Type(ClubType::Sports), true);
        facets.set(FacetValue::Type(ClubType::Arts), true);
        facets.set(FacetValue::Day(MeetingDay::Monday), true);

        assert!(facets.matches(&club("Soccer", ClubType::Sports, MeetingDay::Monday)));
        assert!(facets.matches(&club("Drama", ClubType::Arts, MeetingDay::Monday)));
        assert!(!facets.matches(&club("Tennis", ClubType::Sports, MeetingDay::Friday)));
        assert!(!facets.matches(&club("Debate", ClubType::Academic, MeetingDay::Monday)));
    }

    #[test]
    fn test_missing_field_fails_active_facet() {
        let mut facets = FilterFacets::default();
        facets.set(FacetValue::Time(MeetingTime::Before), true);
        assert!(!facets.matches(&ClubRecord::named("Mystery")));
    }

    #[test]
    fn test_from_checkbox_states() {
        let facets = FilterFacets::from_checkbox_states(|id| match id {
            "checkboxArt" => Some(true),
            "checkboxWeekend" => Some(true),
            "checkboxSports" => Some(false),
            _ => None,
        });

        assert_eq!(facets.types.iter().copied().collect::<Vec<_>>(), vec![ClubType::Arts]);
        assert!(facets.times.is_empty());
        assert!(facets.is_checked(FacetValue::Day(MeetingDay::Weekend)));
    }

    #[test]
    fn test_unknown_checkbox() {
        assert_eq!(FacetValue::from_checkbox("checkboxLunch"), None);
        assert_eq!(
            FacetValue::from_checkbox("checkboxArt"),
            Some(FacetValue::Type(ClubType::Arts))
        );
    }
}
