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

//! The weekday-pattern normal form: a canonical, totally-ordered
//! representation for timetables built purely out of weekday patterns.

use crate::altitude::IntervalSet;
use crate::timetable::element::TimeTableElement;
use crate::timetable::pattern::{wday_to_bit, PatternKind, PatternOp, TimePattern};
use crate::timetable::table::{TimeTable, TimeTableAnd, TimeTableOr, TimeTableTerm};

/// Minutes since local midnight, `[0, 1440]`.
pub type Minute = u16;

pub const MINUTES_PER_DAY: Minute = 1440;

/// Seven slots (Monday..Sunday) of `IntervalSet<Minute>`, the canonical
/// normal form for any `TimeTable` whose every `TimePattern` is
/// `type_weekday`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeekdayPattern {
    days: [IntervalSet<Minute>; 7],
}

impl WeekdayPattern {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn day(&self, wday: u8) -> &IntervalSet<Minute> {
        &self.days[(wday % 7) as usize]
    }

    pub fn day_mut(&mut self, wday: u8) -> &mut IntervalSet<Minute> {
        &mut self.days[(wday % 7) as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(IntervalSet::is_empty)
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut out = Self::empty();
        for d in 0..7 {
            out.days[d] = self.days[d].union(&other.days[d]);
        }
        out
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = Self::empty();
        for d in 0..7 {
            out.days[d] = self.days[d].intersection(&other.days[d]);
        }
        out
    }

    /// Inverted within the full-day interval on every slot.
    pub fn invert(&self) -> Self {
        let mut out = Self::empty();
        for d in 0..7 {
            out.days[d] = self.days[d].complement(0, MINUTES_PER_DAY);
        }
        out
    }

    fn from_element(elem: &TimeTableElement) -> Option<Self> {
        let mut acc = Self::empty();
        for p in &elem.patterns {
            let PatternKind::Weekday(mask) = p.kind else {
                return None;
            };
            let start = (p.starttime / 60) as Minute;
            let end = ((p.endtime + 59) / 60) as Minute;
            for wday in 0..7u8 {
                if mask & wday_to_bit(wday) == 0 {
                    continue;
                }
                let mut day_set = IntervalSet::empty();
                if start < end {
                    day_set.insert(start, end);
                } else if start > end {
                    day_set.insert(start, MINUTES_PER_DAY);
                    day_set.insert(0, end);
                } else {
                    day_set.insert(0, MINUTES_PER_DAY);
                }
                let existing = acc.days[wday as usize].clone();
                acc.days[wday as usize] = match p.op {
                    PatternOp::Set => day_set,
                    PatternOp::Add => existing.union(&day_set),
                    PatternOp::Sub => existing.difference(&day_set, 0, MINUTES_PER_DAY),
                    PatternOp::Invalid => existing,
                };
            }
        }
        Some(acc)
    }

    /// Attempts to convert a whole `TimeTable` into normal form. Fails
    /// (returns `None`) if any element isn't purely weekday-based, or if
    /// the table contains an `exclude` element (those require evaluating
    /// against the other elements rather than a per-day union).
    pub fn try_from_table(table: &TimeTable) -> Option<Self> {
        if table.elements.is_empty() {
            let mut all = Self::empty();
            for d in 0..7 {
                all.days[d].insert(0, MINUTES_PER_DAY);
            }
            return Some(all);
        }
        let mut acc = Self::empty();
        for elem in &table.elements {
            let converted = Self::from_element(elem)?;
            acc = if elem.exclude {
                let inverted = converted.invert();
                acc.intersection(&inverted)
            } else {
                acc.union(&converted)
            };
        }
        Some(acc)
    }

    pub fn try_from_and(and: &TimeTableAnd) -> Option<Self> {
        if and.forced_never {
            return Some(Self::empty());
        }
        let mut acc: Option<Self> = None;
        for term in &and.terms {
            let table_wp = Self::try_from_table(&term.table)?;
            let table_wp = if term.negated { table_wp.invert() } else { table_wp };
            acc = Some(match acc {
                Some(a) => a.intersection(&table_wp),
                None => table_wp,
            });
        }
        Some(acc.unwrap_or_else(|| {
            let mut all = Self::empty();
            for d in 0..7 {
                all.days[d].insert(0, MINUTES_PER_DAY);
            }
            all
        }))
    }

    /// Reconstructs an equivalent `TimeTableAnd`: one `Set`/`Add`-folded
    /// pattern per covered `(day, interval)` pair. Inverse of
    /// `try_from_and` — empty patterns means the conjunction never holds.
    pub fn to_and(&self) -> TimeTableAnd {
        let mut patterns = Vec::new();
        for d in 0..7u8 {
            for &(start, end) in self.days[d as usize].intervals() {
                let op = if patterns.is_empty() { PatternOp::Set } else { PatternOp::Add };
                patterns.push(TimePattern::new(
                    op,
                    PatternKind::Weekday(wday_to_bit(d)),
                    start as u32 * 60,
                    end as u32 * 60,
                ));
            }
        }
        if patterns.is_empty() {
            return TimeTableAnd::never();
        }
        let element = TimeTableElement::new(0, crate::time::OPEN_END, false, patterns);
        TimeTableAnd {
            terms: vec![TimeTableTerm::new(TimeTable { elements: vec![element] })],
            forced_never: false,
        }
    }

    pub fn try_from_or(or: &TimeTableOr) -> Option<Self> {
        if or.ands.is_empty() {
            let mut all = Self::empty();
            for d in 0..7 {
                all.days[d].insert(0, MINUTES_PER_DAY);
            }
            return Some(all);
        }
        let mut acc: Option<Self> = None;
        for and in &or.ands {
            let and_wp = Self::try_from_and(and)?;
            acc = Some(match acc {
                Some(a) => a.union(&and_wp),
                None => and_wp,
            });
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::pattern::{TimePattern, ALL_DAYS, MON};

    #[test]
    fn single_set_pattern_converts_to_matching_day() {
        let elem = TimeTableElement::new(
            0,
            crate::time::OPEN_END,
            false,
            vec![TimePattern::new(PatternOp::Set, PatternKind::Weekday(MON), 8 * 60 * 60, 17 * 60 * 60)],
        );
        let wp = WeekdayPattern::from_element(&elem).unwrap();
        assert_eq!(wp.day(0).intervals(), &[(480, 1020)]);
        assert!(wp.day(1).is_empty());
    }

    #[test]
    fn non_weekday_pattern_fails_conversion() {
        let elem = TimeTableElement::new(
            0,
            crate::time::OPEN_END,
            false,
            vec![TimePattern::new(PatternOp::Set, PatternKind::Holiday, 0, 86_400)],
        );
        assert!(WeekdayPattern::from_element(&elem).is_none());
    }

    #[test]
    fn invert_complements_every_slot() {
        let mut wp = WeekdayPattern::empty();
        wp.day_mut(0).insert(0, 480);
        let inv = wp.invert();
        assert_eq!(inv.day(0).intervals(), &[(480, MINUTES_PER_DAY)]);
        assert_eq!(inv.day(1).intervals(), &[(0, MINUTES_PER_DAY)]);
    }

    #[test]
    fn to_and_round_trips_through_try_from_and() {
        let elem = TimeTableElement::new(
            0,
            crate::time::OPEN_END,
            false,
            vec![TimePattern::new(PatternOp::Set, PatternKind::Weekday(MON), 8 * 60 * 60, 17 * 60 * 60)],
        );
        let wp = WeekdayPattern::from_element(&elem).unwrap();
        let and = wp.to_and();
        let back = WeekdayPattern::try_from_and(&and).unwrap();
        assert_eq!(wp, back);
    }

    #[test]
    fn empty_pattern_reconstructs_as_forced_never() {
        let and = WeekdayPattern::empty().to_and();
        assert!(and.forced_never);
    }

    #[test]
    fn all_days_full_day_round_trips() {
        let elem = TimeTableElement::new(
            0,
            crate::time::OPEN_END,
            false,
            vec![TimePattern::new(PatternOp::Set, PatternKind::Weekday(ALL_DAYS), 0, 86_400)],
        );
        let wp = WeekdayPattern::from_element(&elem).unwrap();
        for d in 0..7 {
            assert_eq!(wp.day(d).intervals(), &[(0, MINUTES_PER_DAY)]);
        }
    }
}
