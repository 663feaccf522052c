// SPDX-License-Identifier: Apache-2.0
// Copyright 2024, 2026 Joe Pearson
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Time instants and half-open time intervals.

use std::collections::BTreeSet;

/// Seconds since the Unix epoch.
pub type TimeInstant = u64;

/// `end == TimeInstant::MAX` denotes an open-ended interval.
pub const OPEN_END: TimeInstant = TimeInstant::MAX;

/// A set of time discontinuities, used by `time_discontinuities()` on
/// timetables and AUP records.
pub type TimeSet = BTreeSet<TimeInstant>;

/// A half-open time interval `[start, end)`.
///
/// A *snapshot* is the degenerate case `start == end != 0`: it describes a
/// single instant rather than a span and is never truncated or dropped by
/// [`is_overlap`]/[`overlap_secs`] logic that otherwise treats `start ==
/// end` as empty.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeInterval {
    pub start: TimeInstant,
    pub end: TimeInstant,
}

impl TimeInterval {
    pub fn new(start: TimeInstant, end: TimeInstant) -> Self {
        Self { start, end }
    }

    pub fn open(start: TimeInstant) -> Self {
        Self {
            start,
            end: OPEN_END,
        }
    }

    /// A snapshot slice: a degenerate, single-instant interval.
    pub fn snapshot(at: TimeInstant) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_snapshot(&self) -> bool {
        self.start == self.end && self.start != 0
    }

    /// `true` for a well-formed non-snapshot span (`start < end`) — the
    /// source's `is_valid()`.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn contains(&self, t: TimeInstant) -> bool {
        self.start <= t && t < self.end
    }

    pub fn is_overlap(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length, in seconds, of the intersection with `other`. Zero if they
    /// don't overlap.
    pub fn overlap_secs(&self, other: &TimeInterval) -> u64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        end.saturating_sub(start)
    }

    pub fn intersection(&self, other: &TimeInterval) -> Option<TimeInterval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TimeInterval::new(start, end))
    }
}

/// Calendar fields of an instant: `(year, month, day-of-month, weekday,
/// seconds-since-midnight)`, `weekday` counted `0 = Monday .. 6 = Sunday`.
/// Built once per query and fed into `TimeTableEval::new`; evaluation
/// itself never touches a clock.
pub fn to_calendar(t: TimeInstant) -> Result<(i32, u8, u8, u8, u32), crate::error::Error> {
    let dt = time::OffsetDateTime::from_unix_timestamp(t as i64).map_err(|e| crate::error::Error::ParseError(e.to_string()))?;
    let year = dt.year();
    let month = u8::from(dt.month());
    let mday = dt.day();
    let wday = dt.weekday().number_days_from_monday();
    let time_of_day = dt.time();
    let daytime = time_of_day.hour() as u32 * 3600 + time_of_day.minute() as u32 * 60 + time_of_day.second() as u32;
    Ok((year, month, mday, wday, daytime))
}

#[cfg(test)]
mod calendar_tests {
    use super::*;

    #[test]
    fn epoch_is_a_thursday_at_midnight() {
        let (year, month, mday, wday, daytime) = to_calendar(0).unwrap();
        assert_eq!((year, month, mday), (1970, 1, 1));
        assert_eq!(wday, 3, "1970-01-01 was a Thursday, 0-indexed Monday");
        assert_eq!(daytime, 0);
    }

    #[test]
    fn daytime_tracks_seconds_since_midnight() {
        let (_, _, _, _, daytime) = to_calendar(3661).unwrap();
        assert_eq!(daytime, 3661);
    }

    #[test]
    fn matches_a_known_calendar_date() {
        let dt = time::macros::datetime!(2024-12-25 10:30:00 UTC);
        let t = dt.unix_timestamp() as TimeInstant;
        let (year, month, mday, wday, daytime) = to_calendar(t).unwrap();
        assert_eq!((year, month, mday), (2024, 12, 25));
        assert_eq!(wday, 2, "2024-12-25 was a Wednesday");
        assert_eq!(daytime, 10 * 3600 + 30 * 60);
    }
}
