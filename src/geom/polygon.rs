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

use geo::BooleanOps;

use super::{Coord, Rect};
use crate::error::Error;

/// Signed area of a ring via the shoelace formula. Positive for
/// counter-clockwise rings.
fn signed_area(ring: &[Coord]) -> f64 {
    let mut sum = 0.0;
    for window in ring.windows(2) {
        let (a, b) = (window[0], window[1]);
        sum += a.x * b.y - b.x * a.y;
    }
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            sum += last.x * first.y - first.x * last.y;
        }
    }
    sum * 0.5
}

fn is_ccw(ring: &[Coord]) -> bool {
    signed_area(ring) > 0.0
}

/// Dan Sunday's winding number contribution of a single edge.
fn winding_edge(v0: Coord, v1: Coord, p: Coord) -> i32 {
    let is_left = (v1.x - v0.x) * (p.y - v0.y) - (p.x - v0.x) * (v1.y - v0.y);
    if v0.y <= p.y {
        if v1.y > p.y && is_left > 0.0 {
            return 1;
        }
    } else if v1.y <= p.y && is_left < 0.0 {
        return -1;
    }
    0
}

fn winding_number_ring(ring: &[Coord], p: Coord) -> i32 {
    let mut wn = 0;
    for window in ring.windows(2) {
        wn += winding_edge(window[0], window[1], p);
    }
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            wn += winding_edge(last, first, p);
        }
    }
    wn
}

/// Whether `p` lies exactly on the segment `(a, b)`, endpoints included.
fn on_segment(a: Coord, b: Coord, p: Coord) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y);
    if cross.abs() > f64::EPSILON * (b.x - a.x).hypot(b.y - a.y).max(1.0) {
        return false;
    }
    let dot = (p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y);
    let len_sq = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    (0.0..=len_sq).contains(&dot)
}

fn ring_contains_point_on_boundary(ring: &[Coord], p: Coord) -> bool {
    ring.windows(2).any(|w| on_segment(w[0], w[1], p))
        || match (ring.first(), ring.last()) {
            (Some(&first), Some(&last)) if first != last => on_segment(last, first, p),
            _ => false,
        }
}

/// Orientation of the triple `(a, b, c)`: positive for counter-clockwise.
fn orient(a: Coord, b: Coord, c: Coord) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// `true` iff segments `(a1,a2)` and `(b1,b2)` properly cross — neither
/// endpoint of either segment lies on the other. Touching at a shared
/// vertex, or colinear overlap, is not a proper crossing.
fn segments_properly_cross(a1: Coord, a2: Coord, b1: Coord, b2: Coord) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn ring_edges_cross_segment(ring: &[Coord], p0: Coord, p1: Coord) -> bool {
    let crosses = ring
        .windows(2)
        .any(|w| segments_properly_cross(w[0], w[1], p0, p1));
    if crosses {
        return true;
    }
    match (ring.first(), ring.last()) {
        (Some(&first), Some(&last)) if first != last => {
            segments_properly_cross(last, first, p0, p1)
        }
        _ => false,
    }
}

fn bbox_of(points: impl Iterator<Item = Coord>) -> Option<Rect> {
    let mut min = None::<Coord>;
    let mut max = None::<Coord>;
    for p in points {
        min = Some(match min {
            None => p,
            Some(m) => Coord {
                x: m.x.min(p.x),
                y: m.y.min(p.y),
            },
        });
        max = Some(match max {
            None => p,
            Some(m) => Coord {
                x: m.x.max(p.x),
                y: m.y.max(p.y),
            },
        });
    }
    match (min, max) {
        (Some(min), Some(max)) => Some(Rect::new(min, max)),
        _ => None,
    }
}

/// One counter-clockwise exterior ring plus clockwise holes.
///
/// The invariant — exterior CCW, holes CW — is established by
/// [`recompute`](Self::recompute), which is run after any vertex is moved by
/// a `PointLink`. `recompute` reports, per ring, whether it reversed the
/// ring so callers can re-index `PointLink`s that reference it.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolygonHole {
    pub exterior: Vec<Coord>,
    pub holes: Vec<Vec<Coord>>,
}

impl PolygonHole {
    pub fn new(exterior: Vec<Coord>, holes: Vec<Vec<Coord>>) -> Self {
        Self { exterior, holes }
    }

    /// Winding number of `p` with respect to the exterior ring plus the
    /// (reversed-winding) holes. Zero means outside.
    pub fn winding_number(&self, p: Coord) -> i32 {
        let mut wn = winding_number_ring(&self.exterior, p);
        for hole in &self.holes {
            wn += winding_number_ring(hole, p);
        }
        wn
    }

    pub fn contains(&self, p: Coord) -> bool {
        self.winding_number(p) != 0
    }

    /// `true` iff `p` lies exactly on the exterior ring or a hole ring.
    pub fn on_boundary(&self, p: Coord) -> bool {
        ring_contains_point_on_boundary(&self.exterior, p)
            || self.holes.iter().any(|h| ring_contains_point_on_boundary(h, p))
    }

    /// `true` iff the segment `(p0, p1)` properly crosses any ring.
    pub fn is_strict_intersection(&self, p0: Coord, p1: Coord) -> bool {
        ring_edges_cross_segment(&self.exterior, p0, p1)
            || self.holes.iter().any(|h| ring_edges_cross_segment(h, p0, p1))
    }

    pub fn bbox(&self) -> Option<Rect> {
        bbox_of(self.exterior.iter().copied().chain(self.holes.iter().flatten().copied()))
    }

    /// Ensures the exterior is CCW and every hole is CW.
    ///
    /// Returns, per ring (exterior first, then holes in order), whether
    /// that ring was reversed — callers must re-index any `PointLink`
    /// referencing a reversed ring with `new_index = size - 1 - old_index`.
    pub fn recompute(&mut self) -> Vec<bool> {
        let mut reversed = Vec::with_capacity(1 + self.holes.len());

        let ext_reversed = !is_ccw(&self.exterior);
        if ext_reversed {
            self.exterior.reverse();
        }
        reversed.push(ext_reversed);

        for hole in &mut self.holes {
            let hole_reversed = is_ccw(hole);
            if hole_reversed {
                hole.reverse();
            }
            reversed.push(hole_reversed);
        }
        reversed
    }

    fn to_geo(&self) -> geo::Polygon<f64> {
        geo::Polygon::new(
            geo::LineString::new(self.exterior.clone()),
            self.holes
                .iter()
                .map(|h| geo::LineString::new(h.clone()))
                .collect(),
        )
    }

    fn from_geo(p: &geo::Polygon<f64>) -> Self {
        Self {
            exterior: p.exterior().0.clone(),
            holes: p.interiors().iter().map(|r| r.0.clone()).collect(),
        }
    }
}

/// A finite union of [`PolygonHole`]s — one airspace component's effective
/// region.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiPolygonHole(pub Vec<PolygonHole>);

impl MultiPolygonHole {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn polygons(&self) -> &[PolygonHole] {
        &self.0
    }

    pub fn polygons_mut(&mut self) -> &mut Vec<PolygonHole> {
        &mut self.0
    }

    pub fn winding_number(&self, p: Coord) -> i32 {
        self.0.iter().map(|poly| poly.winding_number(p)).sum()
    }

    pub fn contains(&self, p: Coord) -> bool {
        self.0.iter().any(|poly| poly.contains(p))
    }

    pub fn on_boundary(&self, p: Coord) -> bool {
        self.0.iter().any(|poly| poly.on_boundary(p))
    }

    pub fn is_strict_intersection(&self, p0: Coord, p1: Coord) -> bool {
        self.0.iter().any(|poly| poly.is_strict_intersection(p0, p1))
    }

    pub fn bbox(&self) -> Option<Rect> {
        self.0.iter().filter_map(|poly| poly.bbox()).fold(None, |acc, r| {
            Some(match acc {
                None => r,
                Some(acc) => merge_rect(acc, r),
            })
        })
    }

    pub fn recompute(&mut self) {
        for poly in &mut self.0 {
            poly.recompute();
        }
    }

    /// Validates both operands (GEOS-style make-valid, substituted here by
    /// `geo`'s boolean-ops engine which self-repairs minor self-intersection
    /// during the union) and returns their union.
    pub fn union(&self, other: &MultiPolygonHole) -> Result<MultiPolygonHole, Error> {
        let a = self.to_geo();
        let b = other.to_geo();
        let unioned = a.union(&b);
        Ok(MultiPolygonHole::from_geo(&unioned))
    }

    fn to_geo(&self) -> geo::MultiPolygon<f64> {
        geo::MultiPolygon::new(self.0.iter().map(PolygonHole::to_geo).collect())
    }

    fn from_geo(mp: &geo::MultiPolygon<f64>) -> Self {
        Self(mp.iter().map(PolygonHole::from_geo).collect())
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

#[cfg(test)]
mod tests {
    use super::*;

    fn disc(cx: f64, cy: f64, r: f64, n: usize) -> PolygonHole {
        let mut pts: Vec<Coord> = (0..n)
            .map(|i| {
                let a = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
                Coord {
                    x: cx + r * a.cos(),
                    y: cy + r * a.sin(),
                }
            })
            .collect();
        pts.push(pts[0]);
        PolygonHole::new(pts, vec![])
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> PolygonHole {
        PolygonHole::new(
            vec![
                Coord { x: x0, y: y0 },
                Coord { x: x1, y: y0 },
                Coord { x: x1, y: y1 },
                Coord { x: x0, y: y1 },
                Coord { x: x0, y: y0 },
            ],
            vec![],
        )
    }

    #[test]
    fn point_in_disc() {
        let poly = disc(8.0, 47.0, 0.2, 12);
        assert!(poly.contains(Coord { x: 8.0, y: 47.0 }));
        assert!(!poly.contains(Coord { x: 9.8, y: 47.0 }));
    }

    #[test]
    fn square_contains_center_not_outside() {
        let sq = square(0.0, 0.0, 1.0, 1.0);
        assert!(sq.contains(Coord { x: 0.5, y: 0.5 }));
        assert!(!sq.contains(Coord { x: 2.0, y: 2.0 }));
    }

    #[test]
    fn vertex_is_on_boundary_not_strictly_inside() {
        let sq = square(0.0, 0.0, 1.0, 1.0);
        let vertex = Coord { x: 0.0, y: 0.0 };
        assert!(sq.on_boundary(vertex));
    }

    #[test]
    fn segment_crossing_square_is_strict_intersection() {
        let sq = square(0.0, 0.0, 1.0, 1.0);
        let p0 = Coord { x: -1.0, y: 0.5 };
        let p1 = Coord { x: 2.0, y: 0.5 };
        assert!(sq.is_strict_intersection(p0, p1));
    }

    #[test]
    fn segment_touching_vertex_is_not_strict_intersection() {
        let sq = square(0.0, 0.0, 1.0, 1.0);
        // passes exactly through the (0,0) corner without crossing the boundary
        let p0 = Coord { x: -1.0, y: -1.0 };
        let p1 = Coord { x: -0.0001, y: -0.0001 };
        assert!(!sq.is_strict_intersection(p0, p1));
    }

    #[test]
    fn recompute_normalizes_winding() {
        let mut cw_square = PolygonHole::new(
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 0.0, y: 1.0 },
                Coord { x: 1.0, y: 1.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 0.0, y: 0.0 },
            ],
            vec![],
        );
        assert!(!is_ccw(&cw_square.exterior));
        let reversed = cw_square.recompute();
        assert_eq!(reversed, vec![true]);
        assert!(is_ccw(&cw_square.exterior));
        assert!(cw_square.contains(Coord { x: 0.5, y: 0.5 }));
    }

    #[test]
    fn multipolygon_union_merges_overlapping_regions() {
        let a = MultiPolygonHole(vec![square(0.0, 0.0, 1.0, 1.0)]);
        let b = MultiPolygonHole(vec![square(0.5, 0.5, 1.5, 1.5)]);
        let u = a.union(&b).expect("union should succeed");
        assert!(u.contains(Coord { x: 0.1, y: 0.1 }));
        assert!(u.contains(Coord { x: 1.4, y: 1.4 }));
        assert!(!u.contains(Coord { x: 2.0, y: 2.0 }));
    }
}
