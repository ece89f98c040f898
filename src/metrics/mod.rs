//! Derived values for rendering the tracked people. Everything here is a pure function of the
//! records and an explicit `now`, nothing reads the clock on its own.

use std::fmt::Display;

use chrono::{DateTime, Utc};

use crate::{
    store::Person,
    utils::{
        percentage::{ratio_percentage, Percentage},
        time::MILLIS_PER_DAY,
    },
};

/// Highest elapsed day count still considered [ColorBucket::Low].
pub const LOW_MAX_DAYS: i64 = 7;
/// Highest elapsed day count still considered [ColorBucket::Medium].
pub const MEDIUM_MAX_DAYS: i64 = 30;

/// Range used when there is nothing to compare against.
pub const EMPTY_RANGE: DaysRange = DaysRange { min: 0, max: 100 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaysRange {
    pub min: i64,
    pub max: i64,
}

/// How urgently a person should be contacted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColorBucket {
    Low,
    Medium,
    High,
}

impl Display for ColorBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorBucket::Low => write!(f, "low"),
            ColorBucket::Medium => write!(f, "medium"),
            ColorBucket::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry<'a> {
    pub person: &'a Person,
    pub days: i64,
    pub percentage: Percentage,
    pub bucket: ColorBucket,
}

/// Whole days between `date` and `now`, rounded down. Dates in the future give negative values.
pub fn days_since(date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - date).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

pub fn days_range(people: &[Person], now: DateTime<Utc>) -> DaysRange {
    range_of(people.iter().map(|p| days_since(p.last_contact, now)))
}

fn range_of(days: impl IntoIterator<Item = i64>) -> DaysRange {
    days.into_iter()
        .fold(None, |range: Option<DaysRange>, d| {
            Some(match range {
                Some(DaysRange { min, max }) => DaysRange {
                    min: min.min(d),
                    max: max.max(d),
                },
                None => DaysRange { min: d, max: d },
            })
        })
        .unwrap_or(EMPTY_RANGE)
}

/// Position of `days` inside `range`. When everyone has the same elapsed days the bar sits in
/// the middle.
pub fn bar_percentage(days: i64, range: DaysRange) -> Percentage {
    if range.max == range.min {
        Percentage::MIDPOINT
    } else {
        ratio_percentage(days, range.min, range.max)
    }
}

/// Lower bucket wins on the boundaries: 7 is low, 30 is medium.
pub fn color_bucket(days: i64) -> ColorBucket {
    if days <= LOW_MAX_DAYS {
        ColorBucket::Low
    } else if days <= MEDIUM_MAX_DAYS {
        ColorBucket::Medium
    } else {
        ColorBucket::High
    }
}

/// Orders people by how long ago they were contacted, longest first. Elapsed days and the range
/// are computed once, so every entry is measured against the same `now`. Ties keep the
/// collection order.
pub fn ranked_view(people: &[Person], now: DateTime<Utc>) -> Vec<RankedEntry<'_>> {
    let days = people
        .iter()
        .map(|p| (p, days_since(p.last_contact, now)))
        .collect::<Vec<_>>();
    let range = range_of(days.iter().map(|(_, d)| *d));

    let mut entries = days
        .into_iter()
        .map(|(person, days)| RankedEntry {
            person,
            days,
            percentage: bar_percentage(days, range),
            bucket: color_bucket(days),
        })
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| b.days.cmp(&a.days));
    entries
}
