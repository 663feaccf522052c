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

//! Seams to out-of-scope collaborators: the object database that resolves
//! `Link`s, and the terrain database `recompute` consults for ground
//! elevation. Both are traits; this crate never implements them.

use std::rc::Rc;

use crate::geom::{MultiPolygonHole, Rect};
use crate::object::Object;
use crate::time::TimeInterval;
use crate::uuid::Uuid;

/// The persistent store of `Object`s that `Link`s resolve against.
pub trait ObjectDatabase {
    /// Looks up an object by `(ident, type, overlap-with-interval)`, as
    /// used when resolving an ingest feature's identity.
    fn find_by_ident(&self, ident: &str, kind: &str, interval: TimeInterval) -> Option<Rc<Object>>;

    /// All objects whose slices transitively depend on `uuid` (the
    /// reverse of `Link` resolution), used to propagate a moved point
    /// into the airspace polygons that reference it.
    fn find_dependson(&self, uuid: Uuid) -> Vec<Rc<Object>>;

    fn find_all(&self, uuid: Uuid) -> Option<Rc<Object>>;

    /// A direct, already-existing route-segment object between `start`
    /// and `end` on `route`, if one exists. `None` means no such segment
    /// is on file — the caller falls back to a reconstructed path.
    fn find_segment(&self, route: Uuid, start: Uuid, end: Uuid) -> Option<Rc<Object>>;
}

/// Breadth-first populates `Link` caches to a requested depth.
pub trait LinkLoader {
    fn resolve(&self, uuid: Uuid, depth: u32) -> Option<Rc<Object>>;
}

/// Ground elevation lookup used by `AirspaceTimeSlice::recompute` to fill
/// components whose ground-elevation fields are invalid.
///
/// Implementations clamp ocean to `0` and ignore nodata cells; elevation
/// is returned in feet.
pub trait TerrainDatabase {
    /// Minimum/maximum ground elevation, in feet, under `poly`'s bounding
    /// box (or more precisely, if the implementation can afford it).
    fn get_minmax_elev(&self, poly: &MultiPolygonHole, bbox: Rect) -> Option<(i32, i32)>;
}

/// A `TerrainDatabase`/`ObjectDatabase` that resolves nothing. Useful in
/// tests and for callers with no collaborator wired up.
pub struct NullCollaborators;

impl TerrainDatabase for NullCollaborators {
    fn get_minmax_elev(&self, _poly: &MultiPolygonHole, _bbox: Rect) -> Option<(i32, i32)> {
        None
    }
}
