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

//! `PointPair`/`DctLeg`: a direct (off-route) leg between two points,
//! gated by an altitude/timetable pair per direction of flight.

use std::cmp::Ordering;

use crate::altitude::BidirAltRange;
use crate::geom::Rect;
use crate::timetable::eval::TimeTableEval;
use crate::timetable::table::TimeTableOr;
use crate::uuid::{Link, Uuid};

/// A point-object placeholder; `PointPair`/`DctLeg` only need its
/// coordinate and bounding box, resolved through a `Link`.
pub trait PointLike {
    fn coord(&self) -> crate::geom::Coord;
}

/// An unordered-by-value pair of point links, ordered for storage by
/// `(uuid0, uuid1)`.
#[derive(Clone, Debug)]
pub struct PointPair<T> {
    points: [Link<T>; 2],
}

impl<T> PointPair<T> {
    pub fn new(pt0: Link<T>, pt1: Link<T>) -> Self {
        Self { points: [pt0, pt1] }
    }

    pub fn point(&self, index: usize) -> &Link<T> {
        &self.points[index & 1]
    }

    pub fn uuid(&self, index: usize) -> Uuid {
        self.points[index & 1].uuid()
    }

    pub fn swapdir(&mut self) {
        self.points.swap(0, 1);
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        self.uuid(0).cmp(&other.uuid(0)).then_with(|| self.uuid(1).cmp(&other.uuid(1)))
    }

    pub fn bbox(&self) -> Option<Rect>
    where
        T: PointLike,
    {
        let p0 = self.points[0].cached()?;
        let p1 = self.points[1].cached()?;
        Some(Rect::new(p0.coord(), p1.coord()))
    }
}

impl<T> PartialEq for PointPair<T> {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}
impl<T> Eq for PointPair<T> {}
impl<T> PartialOrd for PointPair<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}
impl<T> Ord for PointPair<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

/// One altitude/timetable gate of a [`DctLeg`]: the leg is usable, in a
/// given direction, at altitudes in `altrange` during `timetable`.
#[derive(Clone, Debug)]
pub struct DctLegAlt {
    altrange: BidirAltRange,
    timetable: TimeTableOr,
}

impl DctLegAlt {
    pub fn new(altrange: BidirAltRange, timetable: TimeTableOr) -> Self {
        Self { altrange, timetable }
    }

    pub fn altrange(&self) -> &BidirAltRange {
        &self.altrange
    }

    pub fn altrange_mut(&mut self) -> &mut BidirAltRange {
        &mut self.altrange
    }

    pub fn timetable(&self) -> &TimeTableOr {
        &self.timetable
    }

    pub fn is_empty(&self) -> bool {
        self.altrange.is_empty()
    }

    pub fn swapdir(&mut self) {
        self.altrange.swapdir();
    }

    pub fn simplify(&mut self) {
        self.timetable.simplify(true);
    }
}

/// A direct leg between two points: a set of `(altrange, timetable)` gates,
/// each describing when and at what altitude the leg is flyable.
#[derive(Clone, Debug)]
pub struct DctLeg<T> {
    pair: PointPair<T>,
    altset: Vec<DctLegAlt>,
}

impl<T> DctLeg<T> {
    pub fn new(pt0: Link<T>, pt1: Link<T>) -> Self {
        Self {
            pair: PointPair::new(pt0, pt1),
            altset: Vec::new(),
        }
    }

    pub fn pair(&self) -> &PointPair<T> {
        &self.pair
    }

    pub fn altset(&self) -> &[DctLegAlt] {
        &self.altset
    }

    /// Inserts `alt`, merging into any existing gate with an identical
    /// altrange rather than appending a duplicate.
    pub fn add(&mut self, alt: DctLegAlt) {
        for existing in &mut self.altset {
            if existing.altrange == alt.altrange {
                let mut combined = existing.timetable.clone();
                combined |= &alt.timetable;
                existing.timetable = combined;
                return;
            }
        }
        self.altset.push(alt);
    }

    pub fn clear_empty(&mut self) {
        self.altset.retain(|a| !a.is_empty());
    }

    pub fn swapdir(&mut self) {
        self.pair.swapdir();
        for a in &mut self.altset {
            a.swapdir();
        }
    }

    pub fn simplify(&mut self) {
        for a in &mut self.altset {
            a.simplify();
        }
        self.clear_empty();
    }

    pub fn is_empty(&self) -> bool {
        self.altset.is_empty()
    }

    /// Union of altitude ranges usable at `tte`'s time.
    pub fn get_altrange(&self, tte: &TimeTableEval, t: crate::time::TimeInstant) -> BidirAltRange {
        let mut acc = BidirAltRange::default();
        for a in &self.altset {
            if a.timetable.is_inside(tte, t) {
                acc = acc.union(&a.altrange);
            }
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::altitude::IntervalSet;
    use crate::timetable::eval::NullSpecialDateEval;

    #[derive(Debug, PartialEq)]
    struct DummyPoint;

    fn eval() -> TimeTableEval<'static> {
        static EVAL: NullSpecialDateEval = NullSpecialDateEval;
        TimeTableEval::new(2026, 1, 5, 0, 43_200, crate::geom::Coord { x: 0.0, y: 0.0 }, &EVAL)
    }

    #[test]
    fn point_pair_compares_by_uuid_pair() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let pp1: PointPair<DummyPoint> = PointPair::new(Link::new(a), Link::new(b));
        let pp2: PointPair<DummyPoint> = PointPair::new(Link::new(a), Link::new(b));
        assert_eq!(pp1, pp2);
    }

    #[test]
    fn add_merges_same_altrange_gates() {
        let mut leg: DctLeg<DummyPoint> = DctLeg::new(Link::nil(), Link::nil());
        let ar = BidirAltRange::new(IntervalSet::single(0, 1000), IntervalSet::empty());
        leg.add(DctLegAlt::new(ar.clone(), TimeTableOr::single(crate::timetable::TimeTable::always())));
        leg.add(DctLegAlt::new(ar, TimeTableOr::never()));
        assert_eq!(leg.altset().len(), 1);
    }

    #[test]
    fn get_altrange_only_counts_active_gates() {
        let mut leg: DctLeg<DummyPoint> = DctLeg::new(Link::nil(), Link::nil());
        let ar = BidirAltRange::new(IntervalSet::single(0, 1000), IntervalSet::empty());
        leg.add(DctLegAlt::new(ar, TimeTableOr::never()));
        let got = leg.get_altrange(&eval(), 1);
        assert!(got.is_empty());
    }
}
