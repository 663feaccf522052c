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

//! `TimeTableElement`: a validity window plus a fold of [`TimePattern`]s.

use super::eval::TimeTableEval;
use super::pattern::{PatternKind, PatternOp, TimePattern};
use crate::time::{TimeInstant, OPEN_END};

/// A validity-windowed fold of patterns. `exclude` controls how this
/// element combines into its owning [`super::table::TimeTable`]'s fold.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeTableElement {
    pub start: TimeInstant,
    pub end: TimeInstant,
    pub exclude: bool,
    pub patterns: Vec<TimePattern>,
}

impl TimeTableElement {
    pub fn new(start: TimeInstant, end: TimeInstant, exclude: bool, patterns: Vec<TimePattern>) -> Self {
        Self {
            start,
            end,
            exclude,
            patterns,
        }
    }

    pub fn always() -> Self {
        Self::new(0, OPEN_END, false, vec![TimePattern::always()])
    }

    pub fn never() -> Self {
        Self::new(0, OPEN_END, false, Vec::new())
    }

    /// `patterns.is_empty()` is both the "time-of-patterns-is-empty" false
    /// case of `is_inside` and the structural encoding of "never".
    pub fn is_never(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_always(&self) -> bool {
        self.start == 0
            && self.end == OPEN_END
            && self.patterns.len() == 1
            && self.patterns[0].op == PatternOp::Set
            && matches!(self.patterns[0].kind, PatternKind::Always)
    }

    pub fn is_inside(&self, tte: &TimeTableEval, t: TimeInstant) -> bool {
        if t < self.start || t >= self.end {
            return false;
        }
        if self.patterns.is_empty() {
            return false;
        }
        let mut acc = false;
        for p in &self.patterns {
            let v = p.is_inside(tte);
            acc = match p.op {
                PatternOp::Set => v,
                PatternOp::Add => acc || v,
                PatternOp::Sub => acc && !v,
                PatternOp::Invalid => acc,
            };
        }
        acc
    }

    /// Implements the 5-step simplification contract: drop invalid and
    /// structurally-never patterns, collapse leading subtracts, let the
    /// last `set` mask everything before it, and let an `always` pattern
    /// absorb its predecessors (or annihilate the element if it was
    /// itself subtracted).
    pub fn simplify(&mut self) {
        self.patterns.retain(|p| p.op != PatternOp::Invalid);
        self.patterns.retain(|p| !p.is_never());

        while matches!(self.patterns.first(), Some(p) if p.op == PatternOp::Sub) {
            self.patterns.remove(0);
        }
        if let Some(first) = self.patterns.first_mut() {
            first.op = PatternOp::Set;
        }

        if self.patterns.len() > 1 {
            if let Some(rel) = self
                .patterns
                .iter()
                .enumerate()
                .skip(1)
                .rev()
                .find(|(_, p)| p.op == PatternOp::Set)
                .map(|(i, _)| i)
            {
                self.patterns.drain(0..rel);
            }
        }

        if let Some(idx) = self
            .patterns
            .iter()
            .position(|p| matches!(p.kind, PatternKind::Always))
        {
            let absorbed_op = self.patterns[idx].op;
            if absorbed_op == PatternOp::Sub {
                self.patterns.clear();
            } else {
                self.patterns.drain(0..idx);
                self.patterns[0].op = PatternOp::Set;
            }
        }
    }
}
