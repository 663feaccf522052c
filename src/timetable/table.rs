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

//! The three-level boolean algebra: `TimeTable` (fold of elements),
//! `TimeTableAnd` (conjunction), `TimeTableOr` (disjunction).
//!
//! `is_always()`/`is_never()` are the authoritative predicates; an empty
//! `TimeTableOr` is always-true, but an empty `TimeTableAnd` is only
//! always-true when it wasn't explicitly constructed via
//! [`TimeTableAnd::never`] as the conventional "never" sentinel — readers
//! must use `is_never()`, never structural emptiness, to tell the two
//! apart.

use std::ops::{BitAndAssign, BitOrAssign};

use super::element::TimeTableElement;
use super::eval::TimeTableEval;
use crate::time::TimeInstant;

/// A fold of validity-windowed elements: empty means always-true,
/// otherwise OR non-exclude elements in and AND-NOT exclude elements out.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeTable {
    pub elements: Vec<TimeTableElement>,
}

impl TimeTable {
    pub fn always() -> Self {
        Self { elements: Vec::new() }
    }

    pub fn never() -> Self {
        Self {
            elements: vec![TimeTableElement::never()],
        }
    }

    pub fn is_always(&self) -> bool {
        self.elements.is_empty()
            || (self.elements.len() == 1 && !self.elements[0].exclude && self.elements[0].is_always())
    }

    pub fn is_never(&self) -> bool {
        self.elements.len() == 1 && !self.elements[0].exclude && self.elements[0].is_never()
    }

    pub fn is_inside(&self, tte: &TimeTableEval, t: TimeInstant) -> bool {
        if self.elements.is_empty() {
            return true;
        }
        let mut acc = false;
        for e in &self.elements {
            let v = e.is_inside(tte, t);
            acc = if e.exclude { acc && !v } else { acc || v };
        }
        acc
    }

    pub fn simplify(&mut self) {
        for e in &mut self.elements {
            e.simplify();
        }
        self.elements.retain(|e| !(e.exclude && e.is_never()));
    }
}

/// One term of a [`TimeTableAnd`]'s conjunction: a `TimeTable` plus a
/// polarity flag. `negated` lets De Morgan inversion flip a term without
/// rewriting the `TimeTable` it wraps.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeTableTerm {
    pub table: TimeTable,
    pub negated: bool,
}

impl TimeTableTerm {
    pub fn new(table: TimeTable) -> Self {
        Self { table, negated: false }
    }

    fn is_inside(&self, tte: &TimeTableEval, t: TimeInstant) -> bool {
        self.negated ^ self.table.is_inside(tte, t)
    }

    fn is_always(&self) -> bool {
        if self.negated {
            self.table.is_never()
        } else {
            self.table.is_always()
        }
    }

    fn is_never(&self) -> bool {
        if self.negated {
            self.table.is_always()
        } else {
            self.table.is_never()
        }
    }
}

/// A conjunction of [`TimeTableTerm`]s.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeTableAnd {
    pub terms: Vec<TimeTableTerm>,
    /// The conventional "never" sentinel: an otherwise-empty conjunction
    /// that denotes `false` rather than the vacuous `true` an empty
    /// product would normally mean.
    pub forced_never: bool,
}

impl TimeTableAnd {
    pub fn always() -> Self {
        Self {
            terms: Vec::new(),
            forced_never: false,
        }
    }

    pub fn never() -> Self {
        Self {
            terms: Vec::new(),
            forced_never: true,
        }
    }

    pub fn is_always(&self) -> bool {
        !self.forced_never && self.terms.iter().all(TimeTableTerm::is_always)
    }

    pub fn is_never(&self) -> bool {
        self.forced_never || self.terms.iter().any(TimeTableTerm::is_never)
    }

    pub fn is_inside(&self, tte: &TimeTableEval, t: TimeInstant) -> bool {
        if self.forced_never {
            return false;
        }
        self.terms.iter().all(|term| term.is_inside(tte, t))
    }
}

/// A disjunction of [`TimeTableAnd`]s — the top of the algebra.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeTableOr {
    pub ands: Vec<TimeTableAnd>,
}

impl TimeTableOr {
    pub fn always() -> Self {
        Self { ands: Vec::new() }
    }

    pub fn never() -> Self {
        Self {
            ands: vec![TimeTableAnd::never()],
        }
    }

    pub fn single(table: TimeTable) -> Self {
        Self {
            ands: vec![TimeTableAnd {
                terms: vec![TimeTableTerm::new(table)],
                forced_never: false,
            }],
        }
    }

    pub fn is_always(&self) -> bool {
        self.ands.is_empty() || self.ands.iter().any(TimeTableAnd::is_always)
    }

    pub fn is_never(&self) -> bool {
        !self.ands.is_empty() && self.ands.iter().all(TimeTableAnd::is_never)
    }

    pub fn is_inside(&self, tte: &TimeTableEval, t: TimeInstant) -> bool {
        if self.ands.is_empty() {
            return true;
        }
        self.ands.iter().any(|a| a.is_inside(tte, t))
    }

    /// De Morgan inversion: `!(Σ_i Π_j t_ij) = Π_i Σ_j !t_ij`, enumerated
    /// explicitly as the Cartesian product of each AND's negated terms.
    pub fn invert(&self) -> TimeTableOr {
        if self.is_always() {
            return TimeTableOr::never();
        }
        if self.is_never() {
            return TimeTableOr::always();
        }
        let mut acc: Vec<Vec<TimeTableTerm>> = vec![Vec::new()];
        for and in &self.ands {
            let candidates: Vec<TimeTableTerm> = and
                .terms
                .iter()
                .map(|t| TimeTableTerm {
                    table: t.table.clone(),
                    negated: !t.negated,
                })
                .collect();
            let mut next = Vec::with_capacity(acc.len() * candidates.len().max(1));
            for combo in &acc {
                for c in &candidates {
                    let mut v = combo.clone();
                    v.push(c.clone());
                    next.push(v);
                }
            }
            acc = next;
        }
        let mut result = TimeTableOr {
            ands: acc
                .into_iter()
                .map(|terms| TimeTableAnd {
                    terms,
                    forced_never: false,
                })
                .collect(),
        };
        result.simplify(false);
        result
    }

    /// `TimeTableOr::simplify` per the documented contract: simplify and
    /// drop never-ANDs, then optionally consolidate weekday-convertible
    /// ANDs sharing a daytime pattern. An empty result means "always".
    pub fn simplify(&mut self, merge_adj: bool) {
        for and in &mut self.ands {
            for term in &mut and.terms {
                term.table.simplify();
            }
        }
        self.ands.retain(|a| !a.is_never());

        if merge_adj {
            self.merge_weekday_convertible();
        }
    }

    fn merge_weekday_convertible(&mut self) {
        use super::weekday::WeekdayPattern;

        let mut merged: Vec<WeekdayPattern> = Vec::new();
        let mut rest: Vec<TimeTableAnd> = Vec::new();
        for and in self.ands.drain(..) {
            match WeekdayPattern::try_from_and(&and) {
                Some(wp) if !merged.iter().any(|m| *m == wp) => merged.push(wp),
                Some(_) => {}
                None => rest.push(and),
            }
        }
        rest.extend(merged.iter().map(WeekdayPattern::to_and));
        self.ands = rest;
    }
}

impl BitAndAssign<&TimeTableOr> for TimeTableOr {
    fn bitand_assign(&mut self, other: &TimeTableOr) {
        if self.is_never() || other.is_never() {
            *self = TimeTableOr::never();
            return;
        }
        if self.is_always() {
            *self = other.clone();
            return;
        }
        if other.is_always() {
            return;
        }
        let mut combined = Vec::with_capacity(self.ands.len() * other.ands.len());
        for a in &self.ands {
            for b in &other.ands {
                if a.is_never() || b.is_never() {
                    continue;
                }
                let mut terms = a.terms.clone();
                terms.extend(b.terms.iter().cloned());
                combined.push(TimeTableAnd {
                    terms,
                    forced_never: false,
                });
            }
        }
        self.ands = combined;
        self.simplify(false);
    }
}

impl BitOrAssign<&TimeTableOr> for TimeTableOr {
    fn bitor_assign(&mut self, other: &TimeTableOr) {
        if self.is_always() || other.is_always() {
            *self = TimeTableOr::always();
            return;
        }
        self.ands.extend(other.ands.iter().cloned());
        self.simplify(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::eval::NullSpecialDateEval;
    use crate::timetable::pattern::{PatternKind, PatternOp, TimePattern, ALL_DAYS, MON};

    fn eval() -> TimeTableEval<'static> {
        static EVAL: NullSpecialDateEval = NullSpecialDateEval;
        TimeTableEval::new(2026, 1, 5, 0, 43_200, crate::geom::Coord { x: 0.0, y: 0.0 }, &EVAL)
    }

    fn weekday_table(mask: u8) -> TimeTable {
        TimeTable {
            elements: vec![TimeTableElement::new(
                0,
                crate::time::OPEN_END,
                false,
                vec![TimePattern::new(PatternOp::Set, PatternKind::Weekday(mask), 0, 86_400)],
            )],
        }
    }

    #[test]
    fn empty_table_is_always() {
        let t = TimeTable::always();
        assert!(t.is_always());
        assert!(t.is_inside(&eval(), 1));
    }

    #[test]
    fn or_of_one_forced_never_and_is_never() {
        let or = TimeTableOr::never();
        assert!(or.is_never());
        assert!(!or.is_inside(&eval(), 1));
    }

    #[test]
    fn empty_or_is_always() {
        let or = TimeTableOr::always();
        assert!(or.is_always());
        assert!(or.is_inside(&eval(), 1));
    }

    #[test]
    fn and_assign_is_cartesian_product() {
        let mut lhs = TimeTableOr::single(weekday_table(MON));
        let rhs = TimeTableOr::single(weekday_table(ALL_DAYS));
        lhs &= &rhs;
        assert_eq!(lhs.ands.len(), 1);
        assert_eq!(lhs.ands[0].terms.len(), 2);
    }

    #[test]
    fn or_assign_with_always_collapses_to_always() {
        let mut lhs = TimeTableOr::single(weekday_table(MON));
        let rhs = TimeTableOr::always();
        lhs |= &rhs;
        assert!(lhs.is_always());
    }

    #[test]
    fn invert_of_always_is_never_and_vice_versa() {
        assert!(TimeTableOr::always().invert().is_never());
        assert!(TimeTableOr::never().invert().is_always());
    }

    #[test]
    fn invert_flips_evaluation() {
        let or = TimeTableOr::single(weekday_table(MON));
        let inverted = or.invert();
        let e = eval();
        assert_ne!(or.is_inside(&e, 1), inverted.is_inside(&e, 1));
    }

    #[test]
    fn simplify_with_merge_adj_preserves_weekday_coverage() {
        let mut or = TimeTableOr::single(weekday_table(MON));
        or.ands.push(TimeTableAnd {
            terms: vec![TimeTableTerm::new(weekday_table(MON))],
            forced_never: false,
        });
        or.simplify(true);

        let monday = eval();
        assert!(monday.wday_bit() & MON != 0);
        assert!(or.is_inside(&monday, 1), "weekday-convertible coverage must survive simplify(true)");
    }
}
