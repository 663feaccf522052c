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

//! CDR/RSA record payloads and the common temporal contract they share.

use crate::altitude::AltRange;
use crate::object::Object;
use crate::time::{TimeInstant, TimeInterval, TimeSet};
#[cfg(test)]
use crate::altitude::AltMode;
use crate::uuid::{Link, Uuid};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Forward,
    Backward,
}

/// One entry of a CDR record's payload: an altitude band usable in a given
/// direction via a set of host airspaces.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Availability {
    pub altrange: AltRange,
    pub host_airspaces: Vec<Link<Object>>,
    pub cdr_num: u8,
    pub direction: Direction,
}

impl Availability {
    pub fn new(altrange: AltRange, host_airspaces: Vec<Link<Object>>, cdr_num: u8, direction: Direction) -> Self {
        Self {
            altrange,
            host_airspaces,
            cdr_num,
            direction,
        }
    }

    /// Two availabilities merge iff they share `(altrange, direction)`; the
    /// merge replaces `host_airspaces`/`cdr_num` of `self` with `other`'s.
    pub fn mergeable_with(&self, other: &Availability) -> bool {
        self.altrange == other.altrange && self.direction == other.direction
    }

    pub fn merge_from(&mut self, other: &Availability) {
        self.host_airspaces = other.host_airspaces.clone();
        self.cdr_num = other.cdr_num;
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivationStatus {
    Active,
    Invalid,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Activation {
    pub altrange: AltRange,
    pub host_airspaces: Vec<Link<Object>>,
    pub status: ActivationStatus,
}

/// A Conditional Route opening, keyed to a route-segment UUID.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AupCdr {
    pub obj: Link<Object>,
    pub interval: TimeInterval,
    pub availability: Vec<Availability>,
}

/// A Restricted-Sector Activation, keyed to an airspace UUID.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AupRsa {
    pub obj: Link<Object>,
    pub interval: TimeInterval,
    pub activation: Activation,
    pub airspace_type: String,
    pub icao: bool,
    pub level_flags: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AupRecord {
    Cdr(AupCdr),
    Rsa(AupRsa),
}

impl AupRecord {
    pub fn obj(&self) -> Uuid {
        match self {
            Self::Cdr(r) => r.obj.uuid(),
            Self::Rsa(r) => r.obj.uuid(),
        }
    }

    fn host_airspaces(&self) -> Vec<&Link<Object>> {
        match self {
            Self::Cdr(r) => r.availability.iter().flat_map(|a| a.host_airspaces.iter()).collect(),
            Self::Rsa(r) => r.activation.host_airspaces.iter().collect(),
        }
    }

    pub fn interval(&self) -> TimeInterval {
        match self {
            Self::Cdr(r) => r.interval,
            Self::Rsa(r) => r.interval,
        }
    }

    pub fn is_valid(&self) -> bool {
        let iv = self.interval();
        iv.start != iv.end
    }

    pub fn is_overlap(&self, t0: TimeInstant, t1: TimeInstant) -> bool {
        self.interval().is_overlap(&TimeInterval::new(t0, t1))
    }

    pub fn get_overlap(&self, t0: TimeInstant, t1: TimeInstant) -> u64 {
        self.interval().overlap_secs(&TimeInterval::new(t0, t1))
    }

    /// The union of this record's own `start`/`end` with every resolved
    /// host airspace link's own slice-boundary discontinuities. An
    /// unresolved link contributes nothing beyond the record's own
    /// boundary, matching the `{start,end} ∪ ⋃ link.discontinuities`
    /// contract.
    pub fn time_discontinuities(&self) -> TimeSet {
        let iv = self.interval();
        let mut set = TimeSet::new();
        set.insert(iv.start);
        set.insert(iv.end);
        for link in self.host_airspaces() {
            if let Some(obj) = link.cached() {
                set.extend(obj.time_discontinuities());
            }
        }
        set
    }
}

pub fn availability_merge(dst: &mut Vec<Availability>, src: &[Availability]) {
    for incoming in src {
        if let Some(existing) = dst.iter_mut().find(|a| a.mergeable_with(incoming)) {
            existing.merge_from(incoming);
        } else {
            dst.push(incoming.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avail(lo: i32, hi: i32, dir: Direction) -> Availability {
        Availability::new(
            AltRange::new(lo, AltMode::Floor, hi, AltMode::Ceiling),
            vec![Link::new(Uuid::new_v4())],
            1,
            dir,
        )
    }

    #[test]
    fn mergeable_availabilities_replace_host_and_num() {
        let mut dst = vec![avail(10000, 20000, Direction::Forward)];
        let mut incoming = avail(10000, 20000, Direction::Forward);
        incoming.cdr_num = 2;
        availability_merge(&mut dst, &[incoming.clone()]);
        assert_eq!(dst.len(), 1);
        assert_eq!(dst[0].cdr_num, 2);
        assert_eq!(dst[0].host_airspaces, incoming.host_airspaces);
    }

    #[test]
    fn non_mergeable_availabilities_append() {
        let mut dst = vec![avail(10000, 20000, Direction::Forward)];
        availability_merge(&mut dst, &[avail(20000, 30000, Direction::Forward)]);
        assert_eq!(dst.len(), 2);
    }

    #[test]
    fn zero_width_record_is_invalid() {
        let rec = AupRecord::Cdr(AupCdr {
            obj: Link::new(Uuid::new_v4()),
            interval: TimeInterval::new(100, 100),
            availability: vec![],
        });
        assert!(!rec.is_valid());
    }
}
