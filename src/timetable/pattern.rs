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

//! `TimePattern`: the timetable algebra's leaf node.

use super::eval::TimeTableEval;

/// Weekday bitmask, Monday through Sunday.
pub const MON: u8 = 0x01;
pub const TUE: u8 = 0x02;
pub const WED: u8 = 0x04;
pub const THU: u8 = 0x08;
pub const FRI: u8 = 0x10;
pub const SAT: u8 = 0x20;
pub const SUN: u8 = 0x40;
pub const ALL_DAYS: u8 = MON | TUE | WED | THU | FRI | SAT | SUN;

/// How a pattern combines into its owning [`super::element::TimeTableElement`]'s
/// left-fold.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternOp {
    /// Resets the fold accumulator to this pattern's value.
    Set,
    /// ORs this pattern's value into the accumulator.
    Add,
    /// AND-NOTs this pattern's value out of the accumulator.
    Sub,
    /// Marks the pattern for removal during simplification.
    Invalid,
}

/// What a pattern tests against the evaluation environment's date.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternKind {
    Weekday(u8),
    Holiday,
    BusyFriday,
    BeforeHoliday,
    AfterHoliday,
    /// Unconditionally true, day and time-of-day both ignored. Only
    /// produced by simplification as the canonical "always" absorber.
    Always,
}

/// A single leaf test: a daytime-of-day window plus a date predicate.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimePattern {
    pub op: PatternOp,
    pub kind: PatternKind,
    /// Seconds since local midnight, `[0, 86400)`.
    pub starttime: u32,
    /// Seconds since local midnight. `endtime <= starttime` wraps past
    /// midnight into the next day.
    pub endtime: u32,
}

impl TimePattern {
    pub fn new(op: PatternOp, kind: PatternKind, starttime: u32, endtime: u32) -> Self {
        Self {
            op,
            kind,
            starttime,
            endtime,
        }
    }

    pub fn always() -> Self {
        Self::new(PatternOp::Set, PatternKind::Always, 0, 86_400)
    }

    /// Structurally "never": a weekday pattern with an empty daymask never
    /// fires on any day.
    pub fn is_never(&self) -> bool {
        matches!(self.kind, PatternKind::Weekday(mask) if mask == 0)
    }

    fn daytime_matches(&self, daytime: u32) -> bool {
        if self.starttime == self.endtime {
            // Degenerate window: matches the entire day.
            return true;
        }
        if self.starttime < self.endtime {
            self.starttime <= daytime && daytime < self.endtime
        } else {
            // Wraps past midnight.
            daytime >= self.starttime || daytime < self.endtime
        }
    }

    pub fn is_inside(&self, tte: &TimeTableEval) -> bool {
        if matches!(self.kind, PatternKind::Always) {
            return true;
        }
        if !self.daytime_matches(tte.daytime()) {
            return false;
        }
        match self.kind {
            PatternKind::Weekday(mask) => mask & tte.wday_bit() != 0,
            PatternKind::Holiday => tte.is_holiday(),
            PatternKind::BusyFriday => tte.is_busy_friday(),
            PatternKind::BeforeHoliday => tte.is_before_holiday(),
            PatternKind::AfterHoliday => tte.is_after_holiday(),
            PatternKind::Always => true,
        }
    }
}

/// Converts a weekday index (`0 = Monday .. 6 = Sunday`, matching
/// [`TimeTableEval::wday`]) to its daymask bit.
pub fn wday_to_bit(wday: u8) -> u8 {
    match wday % 7 {
        0 => MON,
        1 => TUE,
        2 => WED,
        3 => THU,
        4 => FRI,
        5 => SAT,
        _ => SUN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::eval::NullSpecialDateEval;

    fn eval_at(wday: u8, daytime: u32) -> TimeTableEval<'static> {
        static EVAL: NullSpecialDateEval = NullSpecialDateEval;
        TimeTableEval::new(2026, 1, 1, wday, daytime, crate::geom::Coord { x: 0.0, y: 0.0 }, &EVAL)
    }

    #[test]
    fn weekday_pattern_matches_own_day_only() {
        let p = TimePattern::new(PatternOp::Set, PatternKind::Weekday(MON | WED), 0, 86_400);
        assert!(p.is_inside(&eval_at(0, 0)));
        assert!(!p.is_inside(&eval_at(1, 0)));
    }

    #[test]
    fn wrapping_window_spans_midnight() {
        let p = TimePattern::new(PatternOp::Set, PatternKind::Weekday(ALL_DAYS), 23 * 3600, 1 * 3600);
        assert!(p.is_inside(&eval_at(0, 23 * 3600 + 1800)));
        assert!(p.is_inside(&eval_at(0, 1800)));
        assert!(!p.is_inside(&eval_at(0, 12 * 3600)));
    }

    #[test]
    fn empty_daymask_is_never() {
        let p = TimePattern::new(PatternOp::Set, PatternKind::Weekday(0), 0, 86_400);
        assert!(p.is_never());
        assert!(!p.is_inside(&eval_at(0, 0)));
    }

    #[test]
    fn always_ignores_daytime_and_date() {
        let p = TimePattern::always();
        assert!(p.is_inside(&eval_at(3, 12345)));
    }
}
