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

//! Timetable algebra: the three-level boolean expression tree gating
//! airspace and route-segment activity, plus the conditional-route leg
//! bookkeeping built on top of it.

mod dctleg;
mod element;
mod eval;
mod pattern;
mod table;
mod weekday;

pub use dctleg::{DctLeg, DctLegAlt, PointPair};
pub use element::TimeTableElement;
pub use eval::{NullSpecialDateEval, SpecialDateEval, TimeTableEval};
pub use pattern::{PatternKind, PatternOp, TimePattern, ALL_DAYS, FRI, MON, SAT, SUN, THU, TUE, WED};
pub use table::{TimeTable, TimeTableAnd, TimeTableOr, TimeTableTerm};
pub use weekday::{Minute, WeekdayPattern, MINUTES_PER_DAY};
