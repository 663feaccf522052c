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

//! Converts a parsed AUP feature tree into persistent CDR/RSA records.
//!
//! The XML SAX layer that produces [`ParsedFeature`] trees is out of this
//! crate's scope (§1); this module starts from the already-parsed feature
//! objects and does the resolution and emission described in §4.4.

use std::collections::HashMap;

use crate::altitude::AltRange;
use crate::aup::model::{Activation, Availability, AupCdr, AupRsa, Direction};
use crate::collab::ObjectDatabase;
use crate::time::TimeInterval;
use crate::uuid::{Link, Uuid};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Interpretation {
    Baseline,
    PermDelta,
    TempDelta,
    Snapshot,
}

impl Interpretation {
    pub fn is_snapshot(self) -> bool {
        matches!(self, Self::Snapshot)
    }
}

/// One time-slice of a parsed AUP feature, prior to identity resolution.
#[derive(Clone, Debug)]
pub struct ParsedSlice {
    pub interpretation: Interpretation,
    pub interval: TimeInterval,
    pub ident: Option<String>,
    pub airspace_type: Option<String>,
    pub icao: bool,
    pub level_flags: u32,
}

/// A parsed airspace-activation feature: identity fields plus a sequence of
/// slices and the RSA activation payload each non-snapshot slice carries.
#[derive(Clone, Debug)]
pub struct ParsedAirspaceFeature {
    pub slices: Vec<ParsedSlice>,
    pub activation: Activation,
}

/// A parsed route-segment availability feature (CDR).
#[derive(Clone, Debug)]
pub struct ParsedSegmentFeature {
    pub route_ident: String,
    pub start_ident: String,
    pub end_ident: String,
    pub interval: TimeInterval,
    pub availability: Availability,
}

/// Resolves `host_airspaces` idents to UUIDs via the parse-time ID map
/// recorded while the feature tree was built.
pub struct IdMap {
    by_ident: HashMap<String, Uuid>,
}

impl IdMap {
    pub fn new() -> Self {
        Self { by_ident: HashMap::new() }
    }

    pub fn insert(&mut self, ident: impl Into<String>, uuid: Uuid) {
        self.by_ident.insert(ident.into(), uuid);
    }

    pub fn resolve(&self, ident: &str) -> Option<Uuid> {
        self.by_ident.get(ident).copied()
    }

    pub fn resolve_all<'a>(&self, idents: impl IntoIterator<Item = &'a str>) -> Vec<Uuid> {
        idents.into_iter().filter_map(|i| self.resolve(i)).collect()
    }
}

impl Default for IdMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts `ParseError`-class conditions encountered during a run; printed
/// by the CLI driver at the end (out of scope here), never itself a
/// failure.
#[derive(Default, Debug)]
pub struct IngestStats {
    pub warnings: u32,
    pub errors: u32,
}

/// Resolves one parsed airspace feature to persistent `AupRsa` records,
/// one per non-snapshot slice. Returns an empty vec (and bumps
/// `stats.warnings`) if the feature's identity can't be resolved in the
/// object database.
pub fn resolve_airspace_feature(
    db: &dyn ObjectDatabase,
    ids: &IdMap,
    feature: &ParsedAirspaceFeature,
    host_airspace_idents: &[String],
    stats: &mut IngestStats,
) -> Vec<AupRsa> {
    let Some(snapshot) = feature.slices.iter().find(|s| s.interpretation.is_snapshot()) else {
        log::warn!("airspace feature has no snapshot slice to anchor its identity");
        stats.warnings += 1;
        return Vec::new();
    };
    let Some(ident) = snapshot.ident.as_deref() else {
        log::warn!("airspace feature snapshot slice has no ident");
        stats.warnings += 1;
        return Vec::new();
    };

    let mut out = Vec::new();
    for slice in feature.slices.iter().filter(|s| !s.interpretation.is_snapshot()) {
        let Some(obj) = db.find_by_ident(ident, "airspace", slice.interval) else {
            log::warn!("airspace '{ident}' not found in object database for {:?}", slice.interval);
            stats.warnings += 1;
            continue;
        };
        let airspace_type = slice
            .airspace_type
            .clone()
            .or_else(|| snapshot.airspace_type.clone())
            .unwrap_or_default();
        let host_airspaces = ids
            .resolve_all(host_airspace_idents.iter().map(String::as_str))
            .into_iter()
            .map(Link::new)
            .collect();
        let obj_link = Link::new(obj.uuid);
        obj_link.resolve(obj.clone());
        out.push(AupRsa {
            obj: obj_link,
            interval: slice.interval,
            activation: Activation {
                altrange: feature.activation.altrange,
                host_airspaces,
                status: feature.activation.status,
            },
            airspace_type,
            icao: slice.icao,
            level_flags: slice.level_flags,
        });
    }
    out
}

/// Resolves a route-segment feature to persistent `AupCdr` records.
///
/// Tries the direct route-segment lookup first (`ObjectDatabase::find_segment`);
/// when no such segment is on file, falls back to `segment_chain`, the
/// already-reconstructed ordered list of segment UUIDs the caller obtained
/// by some other means (e.g. Dijkstra over the route's segment graph, a
/// bulk-object-database concern out of this crate's scope).
pub fn resolve_segment_feature(
    db: &dyn ObjectDatabase,
    ids: &IdMap,
    feature: &ParsedSegmentFeature,
    segment_chain: &[Uuid],
    stats: &mut IngestStats,
) -> Vec<AupCdr> {
    let direct = (|| {
        let route = ids.resolve(&feature.route_ident)?;
        let start = ids.resolve(&feature.start_ident)?;
        let end = ids.resolve(&feature.end_ident)?;
        db.find_segment(route, start, end)
    })();
    if let Some(segment) = direct {
        let link = Link::new(segment.uuid);
        link.resolve(segment);
        return vec![AupCdr {
            obj: link,
            interval: feature.interval,
            availability: vec![feature.availability.clone()],
        }];
    }

    if segment_chain.is_empty() {
        log::warn!(
            "could not reconstruct segment chain from '{}' to '{}' on route '{}'",
            feature.start_ident,
            feature.end_ident,
            feature.route_ident
        );
        stats.warnings += 1;
        return Vec::new();
    }
    segment_chain
        .iter()
        .map(|&segment| AupCdr {
            obj: Link::new(segment),
            interval: feature.interval,
            availability: vec![feature.availability.clone()],
        })
        .collect()
}

pub fn cdr_availability(altrange: AltRange, host_airspaces: Vec<Uuid>, cdr_num: u8, direction: Direction) -> Availability {
    Availability::new(altrange, host_airspaces.into_iter().map(Link::new).collect(), cdr_num, direction)
}

/// Saves every resolved record, skipping (and counting) any that is
/// invalid rather than aborting the run — matching the ingest driver's
/// degrade-and-continue policy.
#[cfg(feature = "sqlite")]
pub fn emit(store: &mut crate::aup::store::AupStore, records: impl IntoIterator<Item = AupRecord>, stats: &mut IngestStats) {
    for rec in records {
        if let Err(e) = store.save(rec) {
            log::warn!("failed to save AUP record: {e}");
            stats.errors += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use crate::object::Object;

    #[derive(Default)]
    struct MockDb {
        segment: Option<Rc<Object>>,
    }

    impl ObjectDatabase for MockDb {
        fn find_by_ident(&self, _ident: &str, _kind: &str, _interval: TimeInterval) -> Option<Rc<Object>> {
            None
        }

        fn find_dependson(&self, _uuid: Uuid) -> Vec<Rc<Object>> {
            Vec::new()
        }

        fn find_all(&self, _uuid: Uuid) -> Option<Rc<Object>> {
            None
        }

        fn find_segment(&self, _route: Uuid, _start: Uuid, _end: Uuid) -> Option<Rc<Object>> {
            self.segment.clone()
        }
    }

    #[test]
    fn id_map_resolves_known_idents_and_skips_unknown() {
        let mut ids = IdMap::new();
        let uuid = Uuid::new_v4();
        ids.insert("LSAS", uuid);
        assert_eq!(ids.resolve("LSAS"), Some(uuid));
        assert_eq!(ids.resolve_all(["LSAS", "UNKNOWN"]), vec![uuid]);
    }

    #[test]
    fn empty_segment_chain_warns_and_yields_nothing() {
        let feature = ParsedSegmentFeature {
            route_ident: "UL601".into(),
            start_ident: "DIK".into(),
            end_ident: "SPR".into(),
            interval: TimeInterval::new(0, 1000),
            availability: cdr_availability(AltRange::unrestricted(), vec![], 1, Direction::Forward),
        };
        let mut stats = IngestStats::default();
        let db = MockDb::default();
        let out = resolve_segment_feature(&db, &IdMap::new(), &feature, &[], &mut stats);
        assert!(out.is_empty());
        assert_eq!(stats.warnings, 1);
    }

    #[test]
    fn segment_chain_emits_one_record_per_segment() {
        let feature = ParsedSegmentFeature {
            route_ident: "UL601".into(),
            start_ident: "DIK".into(),
            end_ident: "SPR".into(),
            interval: TimeInterval::new(0, 1000),
            availability: cdr_availability(AltRange::unrestricted(), vec![], 1, Direction::Forward),
        };
        let chain = vec![Uuid::new_v4(), Uuid::new_v4()];
        let mut stats = IngestStats::default();
        let db = MockDb::default();
        let out = resolve_segment_feature(&db, &IdMap::new(), &feature, &chain, &mut stats);
        assert_eq!(out.len(), 2);
        assert_eq!(stats.warnings, 0);
    }

    #[test]
    fn direct_segment_lookup_wins_over_segment_chain() {
        let feature = ParsedSegmentFeature {
            route_ident: "UL601".into(),
            start_ident: "DIK".into(),
            end_ident: "SPR".into(),
            interval: TimeInterval::new(0, 1000),
            availability: cdr_availability(AltRange::unrestricted(), vec![], 1, Direction::Forward),
        };
        let mut ids = IdMap::new();
        ids.insert("UL601", Uuid::new_v4());
        ids.insert("DIK", Uuid::new_v4());
        ids.insert("SPR", Uuid::new_v4());
        let segment = Rc::new(Object::new(Uuid::new_v4()));
        let db = MockDb { segment: Some(segment.clone()) };
        let chain = vec![Uuid::new_v4(), Uuid::new_v4()];
        let mut stats = IngestStats::default();
        let out = resolve_segment_feature(&db, &ids, &feature, &chain, &mut stats);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].obj.uuid(), segment.uuid);
        assert_eq!(stats.warnings, 0);
    }
}
