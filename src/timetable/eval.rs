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

//! The evaluation environment a timetable is tested against.

use std::cell::Cell;

use super::pattern::wday_to_bit;
use crate::geom::Coord;

/// A catalogue of special dates (holidays, busy Fridays, ...) consulted by
/// [`TimeTableEval`]'s lazy flags.
///
/// A date matches when its day (and month, and year if given) match, its
/// authority's boundary airspace contains the query point, and the
/// requested kind matches. The catalogue itself, and the airspace
/// containment check behind it, live outside this crate; this trait is the
/// seam.
pub trait SpecialDateEval {
    fn is_holiday(&self, year: i32, month: u8, mday: u8, point: Coord) -> bool;
    fn is_busy_friday(&self, year: i32, month: u8, mday: u8, point: Coord) -> bool;
    fn is_before_holiday(&self, year: i32, month: u8, mday: u8, point: Coord) -> bool;
    fn is_after_holiday(&self, year: i32, month: u8, mday: u8, point: Coord) -> bool;
}

/// A [`SpecialDateEval`] that never matches. Used in tests and wherever a
/// caller has no holiday catalogue wired up.
pub struct NullSpecialDateEval;

impl SpecialDateEval for NullSpecialDateEval {
    fn is_holiday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
    fn is_busy_friday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
    fn is_before_holiday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
    fn is_after_holiday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
}

/// The environment a [`super::pattern::TimePattern`] chain is tested
/// against: a point in time, a point on the earth, and lazily-evaluated
/// holiday flags backed by a [`SpecialDateEval`].
pub struct TimeTableEval<'a> {
    year: i32,
    month: u8,
    mday: u8,
    wday: u8,
    daytime: u32,
    point: Coord,
    special_eval: &'a dyn SpecialDateEval,
    holiday: Cell<Option<bool>>,
    busy_friday: Cell<Option<bool>>,
    before_holiday: Cell<Option<bool>>,
    after_holiday: Cell<Option<bool>>,
}

impl<'a> TimeTableEval<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: i32,
        month: u8,
        mday: u8,
        wday: u8,
        daytime: u32,
        point: Coord,
        special_eval: &'a dyn SpecialDateEval,
    ) -> Self {
        Self {
            year,
            month,
            mday,
            wday,
            daytime,
            point,
            special_eval,
            holiday: Cell::new(None),
            busy_friday: Cell::new(None),
            before_holiday: Cell::new(None),
            after_holiday: Cell::new(None),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn month(&self) -> u8 {
        self.month
    }
    pub fn mday(&self) -> u8 {
        self.mday
    }
    /// `0 = Monday .. 6 = Sunday`.
    pub fn wday(&self) -> u8 {
        self.wday
    }
    pub fn wday_bit(&self) -> u8 {
        wday_to_bit(self.wday)
    }
    pub fn daytime(&self) -> u32 {
        self.daytime
    }
    pub fn point(&self) -> Coord {
        self.point
    }

    /// A copy of this evaluator at a different point, same date/time and
    /// holiday catalogue. Used when a query needs to re-test a second
    /// point (segment endpoints, the midpoint of a border-touching leg)
    /// against the same instant.
    pub fn with_point(&self, point: Coord) -> TimeTableEval<'a> {
        TimeTableEval::new(
            self.year,
            self.month,
            self.mday,
            self.wday,
            self.daytime,
            point,
            self.special_eval,
        )
    }

    pub fn is_holiday(&self) -> bool {
        self.cached(&self.holiday, |se, y, m, d, p| se.is_holiday(y, m, d, p))
    }

    pub fn is_busy_friday(&self) -> bool {
        self.cached(&self.busy_friday, |se, y, m, d, p| se.is_busy_friday(y, m, d, p))
    }

    pub fn is_before_holiday(&self) -> bool {
        self.cached(&self.before_holiday, |se, y, m, d, p| se.is_before_holiday(y, m, d, p))
    }

    pub fn is_after_holiday(&self) -> bool {
        self.cached(&self.after_holiday, |se, y, m, d, p| se.is_after_holiday(y, m, d, p))
    }

    fn cached(
        &self,
        slot: &Cell<Option<bool>>,
        f: impl Fn(&dyn SpecialDateEval, i32, u8, u8, Coord) -> bool,
    ) -> bool {
        if let Some(v) = slot.get() {
            return v;
        }
        let v = f(self.special_eval, self.year, self.month, self.mday, self.point);
        slot.set(Some(v));
        v
    }
}
