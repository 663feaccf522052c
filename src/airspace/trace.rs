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

//! `Trace`: a diagnostic breadcrumb left by `trace_inside` for each
//! component it visits.

use crate::uuid::{Link, Uuid};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TraceReason {
    Inside,
    Outside,
    Border,
    AltRange,
    OutsideBbox,
    OutsideTime,
    OutsideTimeSlice,
    OutsideTimetable,
    NoIntersect,
}

impl TraceReason {
    /// Whether this reason represents a match (the point/segment is
    /// actually inside/intersecting), as opposed to one of the various
    /// rejection reasons.
    pub fn is_match(&self) -> bool {
        matches!(self, TraceReason::Inside)
    }
}

/// One step of a `trace_inside` diagnostic path.
#[derive(Clone, Debug)]
pub struct Trace {
    pub airspace: Link<crate::object::Object>,
    /// `None` for a step that never reached per-component evaluation
    /// (e.g. rejected by bbox/timetable before any component ran).
    pub component_index: Option<usize>,
    pub reason: TraceReason,
}

impl Trace {
    pub fn new(airspace: Link<crate::object::Object>, component_index: Option<usize>, reason: TraceReason) -> Self {
        Self {
            airspace,
            component_index,
            reason,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.airspace.uuid()
    }
}
