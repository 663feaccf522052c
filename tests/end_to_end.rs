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

//! End-to-end scenarios spanning the containment, timetable and AUP
//! subsystems together, the way a caller actually exercises them.

use std::rc::Rc;

use adr_core::airspace::{AirspaceTimeSlice, AirspaceType, Component, ComponentOperator};
use adr_core::altitude::{AltMode, AltRange};
use adr_core::geom::{Coord, MultiPolygonHole, PolygonHole};
use adr_core::object::{Object, SlicePayload, TimeSlice};
use adr_core::time::{TimeInterval, OPEN_END};
use adr_core::timetable::{
    PatternKind, PatternOp, SpecialDateEval, TimePattern, TimeTable, TimeTableElement,
    TimeTableEval, TimeTableOr, FRI, MON, THU, TUE, WED,
};
use adr_core::uuid::{Link, Uuid};

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

struct NoHolidays;
impl SpecialDateEval for NoHolidays {
    fn is_holiday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
    fn is_busy_friday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
    fn is_before_holiday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
    fn is_after_holiday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
}

fn tte_at(point: Coord, eval: &dyn SpecialDateEval) -> TimeTableEval<'_> {
    TimeTableEval::new(2026, 1, 5, 0, 43_200, point, eval)
}

#[test]
fn point_in_disc_airspace() {
    let mut component = Component::new(ComponentOperator::Base, Link::nil());
    component.poly = MultiPolygonHole(vec![disc(8.0, 47.0, 0.2, 24)]);
    component.altrange = AltRange::new(0, AltMode::Floor, 66_000, AltMode::Ceiling);

    let mut slice = AirspaceTimeSlice::new("TEST_DISC", AirspaceType::Other);
    slice.timetable = TimeTableOr::always();
    slice.components = vec![component];
    slice.recompute_bbox(0, OPEN_END);

    let no_holidays = NoHolidays;
    let inside_pt = Coord { x: 8.0, y: 47.0 };
    let outside_pt = Coord { x: 9.8, y: 47.0 };
    let tte_in = tte_at(inside_pt, &no_holidays);
    let tte_out = tte_at(outside_pt, &no_holidays);

    assert!(slice.is_inside(&tte_in, 0, 10_000, &AltRange::unrestricted(), Uuid::NIL));
    assert!(!slice.is_inside(&tte_out, 0, 10_000, &AltRange::unrestricted(), Uuid::NIL));

    let altitudes = slice.get_point_altitudes(&tte_in, 0, &AltRange::unrestricted(), Uuid::NIL);
    assert_eq!(altitudes.intervals(), &[(0, 66_001)]);
}

#[test]
fn composed_airspace_unions_a_referenced_sub_airspace() {
    // Outer region A; B is a disjoint sub-airspace object referenced by a
    // `Union` component, so containment in B extends containment in the
    // composite even though B lies outside A's own polygon.
    let mut sub_component = Component::new(ComponentOperator::Base, Link::nil());
    sub_component.poly = MultiPolygonHole(vec![square(20.0, 20.0, 22.0, 22.0)]);
    let mut sub_slice = AirspaceTimeSlice::new("B", AirspaceType::Other);
    sub_slice.timetable = TimeTableOr::always();
    sub_slice.components = vec![sub_component];
    sub_slice.recompute_bbox(0, OPEN_END);

    let mut sub_object = Object::new(Uuid::new_v4());
    sub_object.add_timeslice(TimeSlice::new(
        TimeInterval::open(0),
        SlicePayload::Airspace(sub_slice),
    ));

    let b_link: Link<Object> = Link::new(sub_object.uuid);
    b_link.resolve(Rc::new(sub_object));

    let mut base_component = Component::new(ComponentOperator::Base, Link::nil());
    base_component.poly = MultiPolygonHole(vec![square(0.0, 0.0, 10.0, 10.0)]);
    let union_component = Component::new(ComponentOperator::Union, b_link);

    let mut composite = AirspaceTimeSlice::new("A_UNION_B", AirspaceType::Other);
    composite.timetable = TimeTableOr::always();
    composite.components = vec![base_component, union_component];
    composite.recompute_bbox(0, OPEN_END);

    let no_holidays = NoHolidays;
    let in_b = tte_at(Coord { x: 21.0, y: 21.0 }, &no_holidays);
    let in_a_only = tte_at(Coord { x: 5.0, y: 5.0 }, &no_holidays);
    let outside_both = tte_at(Coord { x: 50.0, y: 50.0 }, &no_holidays);

    let ar = AltRange::unrestricted();
    assert!(composite.is_inside(&in_b, 0, 0, &ar, Uuid::NIL));
    assert!(composite.is_inside(&in_a_only, 0, 0, &ar, Uuid::NIL));
    assert!(!composite.is_inside(&outside_both, 0, 0, &ar, Uuid::NIL));
}

#[test]
fn segment_crossing_airspace_is_gated_by_altitude() {
    let mut component = Component::new(ComponentOperator::Base, Link::nil());
    component.poly = MultiPolygonHole(vec![square(0.0, 0.0, 1.0, 1.0)]);
    component.altrange = AltRange::new(10_000, AltMode::Floor, 20_000, AltMode::Ceiling);

    let mut slice = AirspaceTimeSlice::new("SQUARE", AirspaceType::Other);
    slice.timetable = TimeTableOr::always();
    slice.components = vec![component];
    slice.recompute_bbox(0, OPEN_END);

    let no_holidays = NoHolidays;
    let p0 = Coord { x: -1.0, y: 0.5 };
    let p1 = Coord { x: 2.0, y: 0.5 };
    let tte = tte_at(p0, &no_holidays);
    let ar = AltRange::unrestricted();

    assert!(slice.is_intersect(&tte, 0, p1, 15_000, &ar));
    assert!(!slice.is_intersect(&tte, 0, p1, 5_000, &ar));

    let altitudes = slice.get_intersect_altitudes(&tte, 0, p1, &ar);
    assert_eq!(altitudes.intervals(), &[(10_000, 20_001)]);
}

#[test]
fn weekday_timetable_is_inside_only_within_its_window() {
    let element = TimeTableElement::new(
        0,
        OPEN_END,
        false,
        vec![TimePattern::new(
            PatternOp::Set,
            PatternKind::Weekday(MON | TUE | WED | THU | FRI),
            8 * 3600,
            16 * 3600,
        )],
    );
    let table = TimeTableOr::single(TimeTable { elements: vec![element] });
    let no_holidays = NoHolidays;
    let point = Coord { x: 0.0, y: 0.0 };

    let tuesday_ten = TimeTableEval::new(2026, 1, 6, 1, 10 * 3600, point, &no_holidays);
    let saturday_ten = TimeTableEval::new(2026, 1, 10, 5, 10 * 3600, point, &no_holidays);
    let monday_before_open = TimeTableEval::new(2026, 1, 5, 0, 8 * 3600 - 1, point, &no_holidays);
    let monday_at_close = TimeTableEval::new(2026, 1, 5, 0, 16 * 3600, point, &no_holidays);

    assert!(table.is_inside(&tuesday_ten, 1));
    assert!(!table.is_inside(&saturday_ten, 1));
    assert!(!table.is_inside(&monday_before_open, 1));
    assert!(!table.is_inside(&monday_at_close, 1), "16:00:00 is the half-open end, not inside");
}

struct SwissHolidays;

const SWITZERLAND_BBOX: (f64, f64, f64, f64) = (5.9, 45.8, 10.5, 47.9); // (min_lon, min_lat, max_lon, max_lat)

impl SpecialDateEval for SwissHolidays {
    fn is_holiday(&self, year: i32, month: u8, mday: u8, point: Coord) -> bool {
        let (min_lon, min_lat, max_lon, max_lat) = SWITZERLAND_BBOX;
        let in_switzerland = point.x >= min_lon && point.x <= max_lon && point.y >= min_lat && point.y <= max_lat;
        year == 2024 && month == 12 && mday == 25 && in_switzerland
    }
    fn is_busy_friday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
    fn is_before_holiday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
    fn is_after_holiday(&self, _: i32, _: u8, _: u8, _: Coord) -> bool {
        false
    }
}

#[test]
fn holiday_pattern_depends_on_the_query_point() {
    let element = TimeTableElement::new(
        0,
        OPEN_END,
        false,
        vec![TimePattern::new(PatternOp::Set, PatternKind::Holiday, 0, 86_400)],
    );
    let table = TimeTableOr::single(TimeTable { elements: vec![element] });
    let swiss_holidays = SwissHolidays;

    let zurich = Coord { x: 8.54, y: 47.37 };
    let paris = Coord { x: 2.35, y: 48.85 };

    let at_zurich = TimeTableEval::new(2024, 12, 25, 2, 10 * 3600, zurich, &swiss_holidays);
    let at_paris = TimeTableEval::new(2024, 12, 25, 2, 10 * 3600, paris, &swiss_holidays);

    assert!(table.is_inside(&at_zurich, 0));
    assert!(!table.is_inside(&at_paris, 0));
}

#[cfg(feature = "sqlite")]
#[test]
fn cdr_upsert_overlap_splits_coverage_at_store_level() {
    use adr_core::aup::{AupCdr, AupRecord, AupStore, Availability, Direction};
    use adr_core::uuid::Link;

    let mut store = AupStore::open_in_memory().expect("in-memory store opens");
    let obj = Uuid::new_v4();

    let fl100_200 = AltRange::new(10_000, AltMode::Floor, 20_000, AltMode::Ceiling);
    let fl200_300 = AltRange::new(20_000, AltMode::Floor, 30_000, AltMode::Ceiling);

    store
        .save(AupRecord::Cdr(AupCdr {
            obj: Link::new(obj),
            interval: TimeInterval::new(100, 200),
            availability: vec![Availability::new(fl100_200, vec![], 1, Direction::Forward)],
        }))
        .unwrap();
    store
        .save(AupRecord::Cdr(AupCdr {
            obj: Link::new(obj),
            interval: TimeInterval::new(150, 250),
            availability: vec![Availability::new(fl200_300, vec![], 1, Direction::Forward)],
        }))
        .unwrap();

    let at_120 = store.find_point(obj, 120).unwrap().expect("covered");
    let AupRecord::Cdr(cdr) = &at_120 else { panic!("expected a CDR") };
    assert_eq!(cdr.availability.len(), 1);
    assert_eq!(cdr.availability[0].altrange, fl100_200);

    let at_175 = store.find_point(obj, 175).unwrap().expect("covered");
    let AupRecord::Cdr(cdr) = &at_175 else { panic!("expected a CDR") };
    assert_eq!(cdr.availability.len(), 2);

    let at_225 = store.find_point(obj, 225).unwrap().expect("covered");
    let AupRecord::Cdr(cdr) = &at_225 else { panic!("expected a CDR") };
    assert_eq!(cdr.availability.len(), 1);
    assert_eq!(cdr.availability[0].altrange, fl200_300);
}
