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

//! Temporal airspace, route and AUP (CDR/RSA) information core based on
//! the EUROCONTROL ADR/AIXM 5.1 feature model.
//!
//! Four pieces fit together:
//!
//! - [`object`]: versioned objects as a run of time-slices.
//! - [`airspace`]: composed regions with altitude and timetable gating,
//!   and the point/segment/trace query family.
//! - [`timetable`]: the three-level boolean timetable algebra.
//! - [`aup`]: a temporally-sliced store of CDR/RSA availability records.
//!
//! [`collab`] holds the seams to collaborators outside this crate's
//! scope (object resolution, terrain elevation).

pub mod altitude;
pub mod airspace;
pub mod aup;
pub mod collab;
pub mod error;
pub mod geom;
pub mod object;
pub mod time;
pub mod timetable;
pub mod uuid;

pub use error::Error;
