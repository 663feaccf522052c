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

//! An in-memory, point-in-time view over a span of AUP records, built from
//! a `find()` range scan so a caller can answer several `find_point`-style
//! questions without repeated store round-trips.

use crate::aup::model::AupRecord;
use crate::time::{TimeInstant, TimeInterval};
use crate::uuid::Uuid;

/// A sorted, non-overlapping (per object) snapshot of records covering
/// `[window.start, window.end)`, as returned by `AupStore::find`.
#[derive(Clone, Debug, Default)]
pub struct ConditionalAvailability {
    window: TimeInterval,
    records: Vec<AupRecord>,
}

impl ConditionalAvailability {
    pub fn new(window: TimeInterval, mut records: Vec<AupRecord>) -> Self {
        records.sort_by(|a, b| {
            (a.obj(), a.interval().start, a.interval().end).cmp(&(b.obj(), b.interval().start, b.interval().end))
        });
        Self { window, records }
    }

    pub fn window(&self) -> TimeInterval {
        self.window
    }

    pub fn records(&self) -> &[AupRecord] {
        &self.records
    }

    /// The record for `obj` that contains `t`, if any is cached.
    pub fn find_point(&self, obj: Uuid, t: TimeInstant) -> Option<&AupRecord> {
        self.records.iter().find(|r| r.obj() == obj && r.interval().contains(t))
    }

    /// All cached records for `obj` overlapping `[t0,t1)`.
    pub fn find(&self, obj: Uuid, t0: TimeInstant, t1: TimeInstant) -> Vec<&AupRecord> {
        self.records
            .iter()
            .filter(|r| r.obj() == obj && r.is_overlap(t0, t1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aup::model::AupCdr;
    use crate::uuid::Link;

    fn cdr(obj: Uuid, start: TimeInstant, end: TimeInstant) -> AupRecord {
        AupRecord::Cdr(AupCdr {
            obj: Link::new(obj),
            interval: TimeInterval::new(start, end),
            availability: vec![],
        })
    }

    #[test]
    fn find_point_matches_containing_record() {
        let obj = Uuid::new_v4();
        let cache = ConditionalAvailability::new(TimeInterval::new(0, 1000), vec![cdr(obj, 100, 200), cdr(obj, 200, 300)]);
        assert!(cache.find_point(obj, 150).is_some());
        assert!(cache.find_point(obj, 200).is_some());
        assert!(cache.find_point(obj, 300).is_none());
    }

    #[test]
    fn records_are_sorted_by_obj_then_interval() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let cache = ConditionalAvailability::new(TimeInterval::new(0, 1000), vec![cdr(b, 0, 10), cdr(a, 0, 10)]);
        assert_eq!(cache.records()[0].obj().min(cache.records()[1].obj()), cache.records()[0].obj());
    }
}
