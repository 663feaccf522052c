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

//! `AirspaceTimeSlice`: a versioned airspace description — its composed
//! region, timetable and the containment/intersection queries over it.

use crate::altitude::{AltRange, IntervalSet};
use crate::collab::TerrainDatabase;
use crate::error::Error;
use crate::geom::{Coord, MultiPolygonHole, Rect};
use crate::time::TimeInstant;
use crate::timetable::{TimeTableEval, TimeTableOr};
use crate::uuid::{Link, Uuid};

use super::component::{Component, ComponentOperator};
use super::trace::{Trace, TraceReason};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AirspaceType {
    Atz,
    Cba,
    Cta,
    CtaP,
    Ctr,
    D,
    DOther,
    Fir,
    FirP,
    Nas,
    P,
    R,
    Sector,
    Tma,
    Tra,
    Tsa,
    Uir,
    Uta,
    Other,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AirspaceTimeSlice {
    pub ident: String,
    pub kind: AirspaceType,
    pub local_type: String,
    pub bbox: Rect,
    pub timetable: TimeTableOr,
    pub components: Vec<Component>,
}

fn bbox_contains(bbox: Rect, p: Coord) -> bool {
    bbox.min().x <= p.x && p.x <= bbox.max().x && bbox.min().y <= p.y && p.y <= bbox.max().y
}

impl AirspaceTimeSlice {
    pub fn new(ident: impl Into<String>, kind: AirspaceType) -> Self {
        Self {
            ident: ident.into(),
            kind,
            local_type: String::new(),
            bbox: Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }),
            timetable: TimeTableOr::always(),
            components: Vec::new(),
        }
    }

    fn gate(&self, tte: &TimeTableEval, t: TimeInstant) -> bool {
        bbox_contains(self.bbox, tte.point()) && self.timetable.is_inside(tte, t)
    }

    fn fold<F>(&self, mut per_component: F) -> bool
    where
        F: FnMut(&Component) -> bool,
    {
        let mut acc = false;
        for c in &self.components {
            let v = per_component(c);
            acc = match c.operator {
                ComponentOperator::Base => v,
                ComponentOperator::Union => acc || v,
            };
        }
        acc
    }

    fn fold_intervals<F>(&self, mut per_component: F) -> IntervalSet<i32>
    where
        F: FnMut(&Component) -> IntervalSet<i32>,
    {
        let mut acc = IntervalSet::empty();
        for c in &self.components {
            let v = per_component(c);
            acc = match c.operator {
                ComponentOperator::Base => v,
                ComponentOperator::Union => acc.union(&v),
            };
        }
        acc
    }

    pub fn is_inside(&self, tte: &TimeTableEval, t: TimeInstant, alt: i32, altrange: &AltRange, uuid: Uuid) -> bool {
        if !self.gate(tte, t) {
            return false;
        }
        self.fold(|c| c.is_inside(tte, t, alt, altrange, uuid))
    }

    pub fn is_intersect(&self, tte: &TimeTableEval, t: TimeInstant, pt1: Coord, alt: i32, altrange: &AltRange) -> bool {
        if !self.gate(tte, t) {
            return false;
        }
        self.fold(|c| c.is_intersect(tte, t, pt1, alt, altrange))
    }

    pub fn is_intersect_range(
        &self,
        tte: &TimeTableEval,
        t: TimeInstant,
        pt1: Coord,
        alt0: i32,
        alt1: i32,
        altrange: &AltRange,
    ) -> bool {
        if !self.gate(tte, t) {
            return false;
        }
        if !self.is_altitude_overlap(alt0, alt1, t, altrange) {
            return false;
        }
        self.fold(|c| {
            !c.get_intersect_altitudes(tte, t, pt1, altrange)
                .intersection(&AltRange::new(alt0, crate::altitude::AltMode::Floor, alt1, crate::altitude::AltMode::Ceiling).get_interval())
                .is_empty()
        })
    }

    pub fn get_point_altitudes(&self, tte: &TimeTableEval, t: TimeInstant, altrange: &AltRange, uuid: Uuid) -> IntervalSet<i32> {
        if !self.gate(tte, t) {
            return IntervalSet::empty();
        }
        self.fold_intervals(|c| c.get_point_altitudes(tte, t, altrange, uuid))
    }

    pub fn get_intersect_altitudes(&self, tte: &TimeTableEval, t: TimeInstant, pt1: Coord, altrange: &AltRange) -> IntervalSet<i32> {
        if !self.gate(tte, t) {
            return IntervalSet::empty();
        }
        self.fold_intervals(|c| c.get_intersect_altitudes(tte, t, pt1, altrange))
    }

    /// Union of: first endpoint inside (not a vertex), second endpoint
    /// inside (not a vertex), segment strictly intersects, or both
    /// endpoints on the border with the midpoint inside.
    pub fn get_point_intersect_altitudes(
        &self,
        tte: &TimeTableEval,
        t: TimeInstant,
        pt1: Coord,
        altrange: &AltRange,
        uuid0: Uuid,
        uuid1: Uuid,
    ) -> IntervalSet<i32> {
        if !self.gate(tte, t) {
            return IntervalSet::empty();
        }
        let mut acc = self.get_point_altitudes(tte, t, altrange, uuid0);
        let tte1 = tte.with_point(pt1);
        acc = acc.union(&self.get_point_altitudes(&tte1, t, altrange, uuid1));
        acc = acc.union(&self.get_intersect_altitudes(tte, t, pt1, altrange));

        let on_border0 = self.components.iter().any(|c| c.poly.on_boundary(tte.point()));
        let on_border1 = self.components.iter().any(|c| c.poly.on_boundary(pt1));
        if on_border0 && on_border1 {
            let mid = Coord {
                x: (tte.point().x + pt1.x) / 2.0,
                y: (tte.point().y + pt1.y) / 2.0,
            };
            let tte_mid = tte.with_point(mid);
            acc = acc.union(&self.get_point_altitudes(&tte_mid, t, altrange, Uuid::NIL));
        }
        acc
    }

    pub fn is_altitude_overlap(&self, alt0: i32, alt1: i32, t: TimeInstant, altrange: &AltRange) -> bool {
        self.components.iter().any(|c| c.is_altitude_overlap(alt0, alt1, t, altrange))
    }

    pub fn trace_inside(
        &self,
        self_link: Link<crate::object::Object>,
        tte: &TimeTableEval,
        t: TimeInstant,
        alt: i32,
        altrange: &AltRange,
        uuid: Uuid,
    ) -> Vec<Trace> {
        let mut trace = Vec::new();
        if !bbox_contains(self.bbox, tte.point()) {
            trace.push(Trace::new(self_link.clone(), None, TraceReason::OutsideBbox));
            return trace;
        }
        if !self.timetable.is_inside(tte, t) {
            trace.push(Trace::new(self_link.clone(), None, TraceReason::OutsideTimetable));
            return trace;
        }
        let mut acc = false;
        for (idx, c) in self.components.iter().enumerate() {
            let ar = c.merged_altrange(altrange);
            let v = if !ar.is_inside(alt) {
                trace.push(Trace::new(self_link.clone(), Some(idx), TraceReason::AltRange));
                false
            } else if c.is_poly() {
                let reason = if c.is_pointlink(uuid) {
                    TraceReason::Border
                } else if !c.poly.contains(tte.point()) {
                    TraceReason::Outside
                } else {
                    TraceReason::Inside
                };
                trace.push(Trace::new(self_link.clone(), Some(idx), reason));
                reason.is_match()
            } else {
                // Non-leaf: recurse into the sub-airspace's own trace_inside
                // and splice its whole path in, so a failing sub-evaluation
                // surfaces its real reason instead of a synthesized one.
                match c.airspace.cached().and_then(|sub| sub.slice_at(t).cloned()) {
                    Some(slice) => match slice.as_airspace() {
                        Some(aspc) => {
                            let sub_trace = aspc.trace_inside(c.airspace.clone(), tte, t, alt, &ar, uuid);
                            let v = sub_trace.last().is_some_and(|step| step.reason.is_match());
                            trace.extend(sub_trace);
                            v
                        }
                        None => {
                            trace.push(Trace::new(self_link.clone(), Some(idx), TraceReason::OutsideTimeSlice));
                            false
                        }
                    },
                    None => {
                        trace.push(Trace::new(self_link.clone(), Some(idx), TraceReason::OutsideTimeSlice));
                        false
                    }
                }
            };
            acc = match c.operator {
                ComponentOperator::Base => v,
                ComponentOperator::Union => acc || v,
            };
        }
        trace.push(Trace::new(
            self_link,
            None,
            if acc { TraceReason::Inside } else { TraceReason::Outside },
        ));
        trace
    }

    /// Composes each component's polygon (and recursively, the linked
    /// sub-airspace's full polygon at `t`) by the operator chain.
    pub fn get_full_poly(&self, t: TimeInstant) -> Result<MultiPolygonHole, Error> {
        let mut acc = MultiPolygonHole::empty();
        for c in &self.components {
            let part = if c.is_poly() {
                c.poly.clone()
            } else {
                match c.airspace.cached().and_then(|sub| sub.slice_at(t).cloned()) {
                    Some(slice) => match slice.as_airspace() {
                        Some(aspc) => aspc.get_full_poly(t)?,
                        None => MultiPolygonHole::empty(),
                    },
                    None => MultiPolygonHole::empty(),
                }
            };
            acc = match c.operator {
                ComponentOperator::Base => part,
                ComponentOperator::Union => acc.union(&part)?,
            };
        }
        Ok(acc)
    }

    /// Step 1-2 of `recompute`: moves `PointLink` vertices, then
    /// normalizes winding and re-indexes any reversed ring's
    /// `PointLink`s.
    pub fn recompute_geometry(&mut self, t: TimeInstant) -> Result<(), Error> {
        for c in &mut self.components {
            if c.pointlinks.iter().any(|pl| {
                (pl.poly_index as usize) >= c.poly.polygons().len()
                    || (!pl.is_exterior()
                        && c.poly
                            .polygons()
                            .get(pl.poly_index as usize)
                            .is_some_and(|p| pl.ring_index as usize >= p.holes.len()))
            }) {
                return Err(Error::InvariantViolated("PointLink ring/poly index out of range"));
            }
            c.apply_pointlinks(t);
            for poly in c.poly.polygons_mut() {
                let reversed = poly.recompute();
                for pl in &mut c.pointlinks {
                    if pl.poly_index as usize >= reversed.len() {
                        continue;
                    }
                    let ring_len = if pl.is_exterior() {
                        poly.exterior.len()
                    } else {
                        poly.holes.get(pl.ring_index as usize).map_or(0, Vec::len)
                    };
                    let ring_reversed_idx = if pl.is_exterior() { 0 } else { 1 + pl.ring_index as usize };
                    if reversed.get(ring_reversed_idx).copied().unwrap_or(false) && ring_len > 0 {
                        pl.vertex_index = (ring_len - 1 - pl.vertex_index as usize) as u32;
                    }
                }
            }
        }
        Ok(())
    }

    /// Step 3: recomputes the bounding box as the union of component
    /// polygon bboxes and recursively-referenced sub-airspace bboxes
    /// overlapping `[t0,t1)` in time.
    pub fn recompute_bbox(&mut self, t0: TimeInstant, t1: TimeInstant) {
        let mut acc: Option<Rect> = None;
        for c in &self.components {
            let bbox = if c.is_poly() {
                c.bbox()
            } else {
                c.airspace
                    .cached()
                    .and_then(|sub| sub.best_overlap(t0, t1).cloned())
                    .and_then(|slice| slice.as_airspace().map(|a| a.bbox))
            };
            if let Some(b) = bbox {
                acc = Some(match acc {
                    None => b,
                    Some(a) => merge_rect(a, b),
                });
            }
        }
        if let Some(b) = acc {
            self.bbox = b;
        }
    }

    /// Step 4: fills invalid ground-elevation fields from the terrain
    /// collaborator, propagating min/max from referenced sub-airspaces
    /// overlapping `[t0,t1)`.
    pub fn recompute_elevation(&mut self, terrain: &dyn TerrainDatabase, t0: TimeInstant, t1: TimeInstant) {
        for c in &mut self.components {
            if c.gndelevmin.is_some() && c.gndelevmax.is_some() {
                continue;
            }
            if c.is_poly() {
                if let Some(bbox) = c.bbox() {
                    if let Some((min, max)) = terrain.get_minmax_elev(&c.poly, bbox) {
                        c.gndelevmin.get_or_insert(min);
                        c.gndelevmax.get_or_insert(max);
                    }
                }
            } else if let Some(sub) = c.airspace.cached() {
                if let Some(slice) = sub.best_overlap(t0, t1) {
                    if let Some(aspc) = slice.as_airspace() {
                        c.gndelevmin = c.gndelevmin.or_else(|| aspc.components.iter().filter_map(|sc| sc.gndelevmin).min());
                        c.gndelevmax = c.gndelevmax.or_else(|| aspc.components.iter().filter_map(|sc| sc.gndelevmax).max());
                    }
                }
            }
        }
    }

}

fn merge_rect(a: Rect, b: Rect) -> Rect {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}
