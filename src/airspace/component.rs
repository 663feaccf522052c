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

//! `Component`: one term of an airspace time-slice's composed region,
//! either a leaf polygon or a reference to a sub-airspace.

use crate::altitude::{AltRange, IntervalSet};
use crate::geom::{Coord, MultiPolygonHole, Rect};
use crate::object::Object;
use crate::time::TimeInstant;
use crate::timetable::TimeTableEval;
use crate::uuid::{Link, Uuid};

/// How a component combines into its slice's left-fold.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentOperator {
    /// Resets the accumulated region to this component's.
    Base,
    /// Unions this component's region into the accumulator.
    Union,
}

/// Ties one polygon vertex to a designated point so the polygon follows
/// when the point moves.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointLink {
    pub link: Link<crate::object::Object>,
    pub poly_index: u16,
    pub ring_index: u16,
    pub vertex_index: u32,
}

/// Ring index sentinel for the exterior ring, matching `PolygonHole`'s
/// convention of exterior-then-holes.
pub const EXTERIOR_RING: u16 = u16::MAX;

impl PointLink {
    pub fn new(link: Link<Object>, poly_index: u16, ring_index: u16, vertex_index: u32) -> Self {
        Self {
            link,
            poly_index,
            ring_index,
            vertex_index,
        }
    }

    pub fn is_exterior(&self) -> bool {
        self.ring_index == EXTERIOR_RING
    }
}

/// One term of an `AirspaceTimeSlice`'s composed region: either a leaf
/// polygon (`poly` non-empty) or a reference to a sub-airspace.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    pub operator: ComponentOperator,
    pub altrange: AltRange,
    pub full_geometry: bool,
    pub gndelevmin: Option<i32>,
    pub gndelevmax: Option<i32>,
    pub airspace: Link<Object>,
    pub poly: MultiPolygonHole,
    pub pointlinks: Vec<PointLink>,
}

impl Component {
    pub fn new(operator: ComponentOperator, airspace: Link<Object>) -> Self {
        Self {
            operator,
            altrange: AltRange::unrestricted(),
            full_geometry: false,
            gndelevmin: None,
            gndelevmax: None,
            airspace,
            poly: MultiPolygonHole::empty(),
            pointlinks: Vec::new(),
        }
    }

    /// A leaf component carries its own geometry; a non-leaf recurses
    /// into `airspace`.
    pub fn is_poly(&self) -> bool {
        !self.poly.is_empty()
    }

    /// `true` if `uuid` names any of this component's `PointLink`
    /// vertices — used to suppress a containment match when the query
    /// point *is* one of the polygon's own follow-point vertices.
    pub fn is_pointlink(&self, uuid: Uuid) -> bool {
        !uuid.is_nil() && self.pointlinks.iter().any(|pl| pl.link.uuid() == uuid)
    }

    /// Narrows `caller_altrange` by this component's own `altrange`,
    /// honoring the rule that a non-leaf "full geometry" component
    /// doesn't re-gate: the merge only happens for leaf polygons, or for
    /// non-leaves that aren't flagged `full_geometry`.
    pub fn merged_altrange(&self, caller_altrange: &AltRange) -> AltRange {
        if self.is_poly() || !self.full_geometry {
            caller_altrange.merge(&self.altrange)
        } else {
            *caller_altrange
        }
    }

    pub fn bbox(&self) -> Option<Rect> {
        self.poly.bbox()
    }

    /// Overwrites each linked vertex with its point's coordinate at `t`.
    /// Returns `true` if any vertex actually moved.
    pub fn apply_pointlinks(&mut self, t: crate::time::TimeInstant) -> bool {
        let mut changed = false;
        for pl in &self.pointlinks {
            let Some(target) = pl.link.cached() else { continue };
            let coord = target_coord(&target, t);
            let Some(poly) = self.poly.polygons_mut().get_mut(pl.poly_index as usize) else {
                continue;
            };
            let ring: &mut Vec<Coord> = if pl.is_exterior() {
                &mut poly.exterior
            } else {
                match poly.holes.get_mut(pl.ring_index as usize) {
                    Some(h) => h,
                    None => continue,
                }
            };
            if let Some(vertex) = ring.get_mut(pl.vertex_index as usize) {
                if *vertex != coord {
                    *vertex = coord;
                    changed = true;
                }
            }
        }
        changed
    }

    fn sub_slice(&self, _t: TimeInstant) -> Option<std::rc::Rc<Object>> {
        self.airspace.cached()
    }

    /// Point-in-component with altitude gating, recursing (re-running the
    /// full gated `AirspaceTimeSlice::is_inside`) into the sub-airspace's
    /// slice active at `t` when this component isn't a leaf polygon.
    pub fn is_inside(&self, tte: &TimeTableEval, t: TimeInstant, alt: i32, altrange: &AltRange, uuid: Uuid) -> bool {
        let ar = self.merged_altrange(altrange);
        if self.is_poly() {
            if !ar.is_inside(alt) {
                return false;
            }
            if self.is_pointlink(uuid) {
                return false;
            }
            self.poly.contains(tte.point())
        } else {
            let Some(sub) = self.sub_slice(t) else { return false };
            let Some(slice) = sub.slice_at(t) else { return false };
            let Some(aspc) = slice.as_airspace() else { return false };
            aspc.is_inside(tte, t, alt, &ar, uuid)
        }
    }

    /// Strict segment intersection, gated by altitude and (for a
    /// non-leaf) recursion into the sub-airspace.
    pub fn is_intersect(&self, tte: &TimeTableEval, t: TimeInstant, pt1: Coord, alt: i32, altrange: &AltRange) -> bool {
        let ar = self.merged_altrange(altrange);
        if self.is_poly() {
            if !ar.is_inside(alt) {
                return false;
            }
            self.poly.is_strict_intersection(tte.point(), pt1)
        } else {
            let Some(sub) = self.sub_slice(t) else { return false };
            let Some(slice) = sub.slice_at(t) else { return false };
            let Some(aspc) = slice.as_airspace() else { return false };
            aspc.is_intersect(tte, t, pt1, alt, &ar)
        }
    }

    pub fn get_point_altitudes(&self, tte: &TimeTableEval, t: TimeInstant, altrange: &AltRange, uuid: Uuid) -> IntervalSet<i32> {
        let ar = self.merged_altrange(altrange);
        if self.is_poly() {
            if self.is_pointlink(uuid) || !self.poly.contains(tte.point()) {
                return IntervalSet::empty();
            }
            ar.get_interval()
        } else {
            let Some(sub) = self.sub_slice(t) else { return IntervalSet::empty() };
            let Some(slice) = sub.slice_at(t) else { return IntervalSet::empty() };
            let Some(aspc) = slice.as_airspace() else { return IntervalSet::empty() };
            aspc.get_point_altitudes(tte, t, &ar, uuid)
        }
    }

    pub fn get_intersect_altitudes(&self, tte: &TimeTableEval, t: TimeInstant, pt1: Coord, altrange: &AltRange) -> IntervalSet<i32> {
        let ar = self.merged_altrange(altrange);
        if self.is_poly() {
            if !self.poly.is_strict_intersection(tte.point(), pt1) {
                return IntervalSet::empty();
            }
            ar.get_interval()
        } else {
            let Some(sub) = self.sub_slice(t) else { return IntervalSet::empty() };
            let Some(slice) = sub.slice_at(t) else { return IntervalSet::empty() };
            let Some(aspc) = slice.as_airspace() else { return IntervalSet::empty() };
            aspc.get_intersect_altitudes(tte, t, pt1, &ar)
        }
    }

    pub fn is_altitude_overlap(&self, alt0: i32, alt1: i32, t: TimeInstant, altrange: &AltRange) -> bool {
        let ar = self.merged_altrange(altrange);
        if self.is_poly() {
            ar.is_overlap(alt0, alt1)
        } else {
            let Some(sub) = self.sub_slice(t) else { return false };
            let Some(slice) = sub.slice_at(t) else { return false };
            let Some(aspc) = slice.as_airspace() else { return false };
            aspc.is_altitude_overlap(alt0, alt1, t, &ar)
        }
    }
}

fn target_coord(obj: &Object, t: crate::time::TimeInstant) -> Coord {
    obj.slice_at(t)
        .and_then(|ts| ts.as_point_ident())
        .map(|p| p.point)
        .unwrap_or(Coord { x: 0.0, y: 0.0 })
}
