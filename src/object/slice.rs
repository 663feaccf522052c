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

//! `TimeSlice`: a validity-windowed, polymorphic payload. The `as_*`
//! family are safe pattern-extraction accessors returning `Option`.

use crate::airspace::AirspaceTimeSlice;
use crate::geom::Coord;
use crate::object::Object;
use crate::time::TimeInterval;
use crate::uuid::Link;

#[derive(Clone, Debug)]
pub struct IdentTimeSlice {
    pub ident: String,
}

#[derive(Clone, Debug)]
pub struct PointIdentTimeSlice {
    pub ident: String,
    pub point: Coord,
}

#[derive(Clone, Debug)]
pub struct RouteSegmentTimeSlice {
    pub start: Link<Object>,
    pub end: Link<Object>,
    pub route: Link<Object>,
}

/// The payload carried by one `TimeSlice`, tagged by variant.
#[derive(Clone, Debug)]
pub enum SlicePayload {
    Ident(IdentTimeSlice),
    PointIdent(PointIdentTimeSlice),
    Airspace(AirspaceTimeSlice),
    RouteSegment(RouteSegmentTimeSlice),
}

/// A `[start, end)` validity window plus a polymorphic payload.
#[derive(Clone, Debug)]
pub struct TimeSlice {
    pub interval: TimeInterval,
    pub payload: SlicePayload,
}

impl TimeSlice {
    pub fn new(interval: TimeInterval, payload: SlicePayload) -> Self {
        Self { interval, payload }
    }

    pub fn is_snapshot(&self) -> bool {
        self.interval.is_snapshot()
    }

    pub fn is_valid(&self) -> bool {
        self.interval.is_valid() || self.is_snapshot()
    }

    pub fn as_ident(&self) -> Option<&IdentTimeSlice> {
        match &self.payload {
            SlicePayload::Ident(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_point_ident(&self) -> Option<&PointIdentTimeSlice> {
        match &self.payload {
            SlicePayload::PointIdent(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_airspace(&self) -> Option<&AirspaceTimeSlice> {
        match &self.payload {
            SlicePayload::Airspace(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_airspace_mut(&mut self) -> Option<&mut AirspaceTimeSlice> {
        match &mut self.payload {
            SlicePayload::Airspace(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_route_segment(&self) -> Option<&RouteSegmentTimeSlice> {
        match &self.payload {
            SlicePayload::RouteSegment(s) => Some(s),
            _ => None,
        }
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.payload {
            SlicePayload::Ident(s) => Some(&s.ident),
            SlicePayload::PointIdent(s) => Some(&s.ident),
            SlicePayload::Airspace(s) => Some(&s.ident),
            SlicePayload::RouteSegment(_) => None,
        }
    }
}
