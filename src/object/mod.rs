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

//! The temporal object model: a versioned object as an ordered run of
//! non-overlapping (outside snapshots) time-slices.

mod slice;

pub use slice::{IdentTimeSlice, PointIdentTimeSlice, RouteSegmentTimeSlice, SlicePayload, TimeSlice};

use crate::time::{TimeInstant, TimeSet};
use crate::uuid::Uuid;

/// A versioned object: an identity plus its history of time-slices.
#[derive(Clone, Debug)]
pub struct Object {
    pub uuid: Uuid,
    slices: Vec<TimeSlice>,
}

impl Object {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            slices: Vec::new(),
        }
    }

    pub fn slices(&self) -> &[TimeSlice] {
        &self.slices
    }

    pub fn by_index(&self, index: usize) -> Option<&TimeSlice> {
        self.slices.get(index)
    }

    /// The first slice whose validity interval contains `t`. Linear scan;
    /// after `clean_timeslices` the slices are sorted by `(start, end)` so
    /// this also returns the earliest-starting match.
    pub fn slice_at(&self, t: TimeInstant) -> Option<&TimeSlice> {
        self.slices.iter().find(|ts| ts.interval.contains(t))
    }

    /// The slice maximising overlap with `[t0, t1)`. `None` if every slice
    /// has zero overlap (including when the object has no slices at all).
    pub fn best_overlap(&self, t0: TimeInstant, t1: TimeInstant) -> Option<&TimeSlice> {
        let want = crate::time::TimeInterval::new(t0, t1);
        self.slices
            .iter()
            .map(|ts| (ts, ts.interval.overlap_secs(&want)))
            .filter(|(_, secs)| *secs > 0)
            .max_by_key(|(_, secs)| *secs)
            .map(|(ts, _)| ts)
    }

    /// The union of every slice's `start`/`end` boundaries.
    pub fn time_discontinuities(&self) -> TimeSet {
        let mut set = TimeSet::new();
        for ts in &self.slices {
            set.insert(ts.interval.start);
            set.insert(ts.interval.end);
        }
        set
    }

    /// Appends `ts` and re-normalizes the slice run.
    pub fn add_timeslice(&mut self, ts: TimeSlice) {
        self.slices.push(ts);
        self.clean_timeslices(0);
    }

    /// Re-normalizes the slice run:
    ///
    /// 1. stable-sort by `(start, end)`;
    /// 2. snapshot slices are left untouched;
    /// 3. for every pair of adjacent non-snapshot slices that overlap, the
    ///    earlier slice's `end` is truncated to the later slice's `start`;
    /// 4. any slice that is neither valid nor a snapshot, or whose `end <=
    ///    cutoff`, is dropped.
    pub fn clean_timeslices(&mut self, cutoff: TimeInstant) {
        self.slices
            .sort_by(|a, b| (a.interval.start, a.interval.end).cmp(&(b.interval.start, b.interval.end)));

        for i in 0..self.slices.len().saturating_sub(1) {
            let (left, right) = self.slices.split_at_mut(i + 1);
            let earlier = &mut left[i];
            let later = &right[0];
            if earlier.is_snapshot() || later.is_snapshot() {
                continue;
            }
            if earlier.interval.is_overlap(&later.interval) {
                earlier.interval.end = later.interval.start;
            }
        }

        self.slices
            .retain(|ts| (ts.is_valid() || ts.is_snapshot()) && ts.interval.end > cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeInterval;

    fn ident_slice(start: TimeInstant, end: TimeInstant, ident: &str) -> TimeSlice {
        TimeSlice::new(
            TimeInterval::new(start, end),
            SlicePayload::Ident(IdentTimeSlice { ident: ident.into() }),
        )
    }

    #[test]
    fn slice_at_finds_containing_slice() {
        let mut obj = Object::new(Uuid::new_v4());
        obj.add_timeslice(ident_slice(0, 100, "a"));
        obj.add_timeslice(ident_slice(100, 200, "b"));

        assert_eq!(obj.slice_at(50).unwrap().ident(), Some("a"));
        assert_eq!(obj.slice_at(150).unwrap().ident(), Some("b"));
        assert!(obj.slice_at(200).is_none());
    }

    #[test]
    fn add_timeslice_truncates_overlapping_predecessor() {
        let mut obj = Object::new(Uuid::new_v4());
        obj.add_timeslice(ident_slice(0, 200, "old"));
        obj.add_timeslice(ident_slice(100, 300, "new"));

        assert_eq!(obj.slices()[0].interval, TimeInterval::new(0, 100));
        assert_eq!(obj.slices()[1].interval, TimeInterval::new(100, 300));
    }

    #[test]
    fn snapshot_slices_are_never_truncated() {
        let mut obj = Object::new(Uuid::new_v4());
        obj.add_timeslice(ident_slice(0, 200, "span"));
        obj.add_timeslice(TimeSlice::new(
            TimeInterval::snapshot(50),
            SlicePayload::Ident(IdentTimeSlice { ident: "snap".into() }),
        ));

        assert!(obj.slices().iter().any(|ts| ts.interval == TimeInterval::new(0, 200)));
        assert!(obj.slices().iter().any(|ts| ts.interval.is_snapshot()));
    }

    #[test]
    fn clean_timeslices_drops_slices_at_or_before_cutoff() {
        let mut obj = Object::new(Uuid::new_v4());
        obj.add_timeslice(ident_slice(0, 100, "old"));
        obj.add_timeslice(ident_slice(100, 200, "new"));

        obj.clean_timeslices(100);
        assert_eq!(obj.slices().len(), 1);
        assert_eq!(obj.slices()[0].ident(), Some("new"));
    }

    #[test]
    fn best_overlap_picks_maximal_intersection() {
        let mut obj = Object::new(Uuid::new_v4());
        obj.add_timeslice(ident_slice(0, 50, "short"));
        obj.add_timeslice(ident_slice(50, 300, "long"));

        let best = obj.best_overlap(40, 200).unwrap();
        assert_eq!(best.ident(), Some("long"));
    }

    #[test]
    fn best_overlap_is_none_when_disjoint() {
        let mut obj = Object::new(Uuid::new_v4());
        obj.add_timeslice(ident_slice(0, 50, "a"));
        assert!(obj.best_overlap(100, 200).is_none());
    }
}
