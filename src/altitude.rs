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

//! Altitude intervals and the generic interval-set algebra they're built on.

use std::fmt;

/// A finite union of disjoint, non-adjacent, sorted half-open intervals
/// `[start, end)` over an ordered type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntervalSet<T> {
    intervals: Vec<(T, T)>,
}

impl<T> IntervalSet<T>
where
    T: Ord + Copy,
{
    pub fn empty() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    pub fn single(start: T, end: T) -> Self {
        let mut s = Self::empty();
        if start < end {
            s.intervals.push((start, end));
        }
        s
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn intervals(&self) -> &[(T, T)] {
        &self.intervals
    }

    pub fn contains(&self, t: T) -> bool {
        self.intervals
            .iter()
            .any(|&(s, e)| s <= t && t < e)
    }

    pub fn insert(&mut self, start: T, end: T) {
        if start >= end {
            return;
        }
        self.intervals.push((start, end));
        self.canonicalize();
    }

    fn canonicalize(&mut self) {
        self.intervals.retain(|&(s, e)| s < e);
        self.intervals.sort_by_key(|&(s, _)| s);
        let mut merged: Vec<(T, T)> = Vec::with_capacity(self.intervals.len());
        for &(s, e) in &self.intervals {
            match merged.last_mut() {
                Some((_, last_end)) if s <= *last_end => {
                    if e > *last_end {
                        *last_end = e;
                    }
                }
                _ => merged.push((s, e)),
            }
        }
        self.intervals = merged;
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for &(s, e) in &other.intervals {
            out.intervals.push((s, e));
        }
        out.canonicalize();
        out
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = Vec::new();
        for &(s0, e0) in &self.intervals {
            for &(s1, e1) in &other.intervals {
                let s = s0.max(s1);
                let e = e0.min(e1);
                if s < e {
                    out.push((s, e));
                }
            }
        }
        let mut result = Self { intervals: out };
        result.canonicalize();
        result
    }

    /// Complement within `[universe_start, universe_end)`.
    pub fn complement(&self, universe_start: T, universe_end: T) -> Self {
        let mut out = Self::empty();
        let mut cursor = universe_start;
        for &(s, e) in &self.intervals {
            let s = s.max(universe_start).min(universe_end);
            let e = e.max(universe_start).min(universe_end);
            if cursor < s {
                out.intervals.push((cursor, s));
            }
            if e > cursor {
                cursor = e;
            }
        }
        if cursor < universe_end {
            out.intervals.push((cursor, universe_end));
        }
        out
    }

    pub fn difference(&self, other: &Self, universe_start: T, universe_end: T) -> Self {
        self.intersection(&other.complement(universe_start, universe_end))
    }
}

impl<T: fmt::Display + Copy> fmt::Display for IntervalSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .intervals
            .iter()
            .map(|(s, e)| format!("[{s},{e})"))
            .collect();
        write!(f, "{}", parts.join(" \u{222a} "))
    }
}

/// Vertical reference mode for one end of an [`AltRange`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AltMode {
    Qnh,
    Std,
    Height,
    Floor,
    Ceiling,
    Unlimited,
    /// This bound doesn't restrict the query — the "don't care" sentinel.
    Ignore,
}

/// An altitude band with a reference mode on each end.
///
/// `lower_alt`/`upper_alt` are only meaningful when the corresponding mode
/// isn't [`AltMode::Ignore`]; [`AltMode::Unlimited`] on the upper end means
/// there is no ceiling.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AltRange {
    pub lower_alt: i32,
    pub lower_mode: AltMode,
    pub upper_alt: i32,
    pub upper_mode: AltMode,
}

impl Default for AltRange {
    fn default() -> Self {
        Self::unrestricted()
    }
}

impl AltRange {
    /// An `AltRange` that imposes no restriction at either end.
    pub fn unrestricted() -> Self {
        Self {
            lower_alt: 0,
            lower_mode: AltMode::Ignore,
            upper_alt: 0,
            upper_mode: AltMode::Ignore,
        }
    }

    pub fn new(lower_alt: i32, lower_mode: AltMode, upper_alt: i32, upper_mode: AltMode) -> Self {
        Self {
            lower_alt,
            lower_mode,
            upper_alt,
            upper_mode,
        }
    }

    pub fn is_lower_valid(&self) -> bool {
        self.lower_mode != AltMode::Ignore
    }

    pub fn is_upper_valid(&self) -> bool {
        self.upper_mode != AltMode::Ignore
    }

    pub fn is_valid(&self) -> bool {
        self.lower_bound() <= self.upper_bound()
    }

    fn lower_bound(&self) -> i32 {
        if self.is_lower_valid() {
            self.lower_alt
        } else {
            i32::MIN
        }
    }

    fn upper_bound(&self) -> i32 {
        match self.upper_mode {
            AltMode::Unlimited | AltMode::Ignore => i32::MAX,
            _ => self.upper_alt,
        }
    }

    pub fn lower_alt_if_valid(&self) -> Option<i32> {
        self.is_lower_valid().then_some(self.lower_alt)
    }

    pub fn upper_alt_if_valid(&self) -> Option<i32> {
        self.is_upper_valid().then_some(self.upper_alt)
    }

    /// Whether `alt` lies within this (closed) band.
    pub fn is_inside(&self, alt: i32) -> bool {
        self.lower_bound() <= alt && alt <= self.upper_bound()
    }

    /// Whether the closed band `[alt0, alt1]` overlaps this range.
    pub fn is_overlap(&self, alt0: i32, alt1: i32) -> bool {
        let (lo, hi) = if alt0 <= alt1 { (alt0, alt1) } else { (alt1, alt0) };
        lo <= self.upper_bound() && self.lower_bound() <= hi
    }

    /// Intersects `self` with `other`, narrowing to the tighter of the two
    /// bands on each end. Used when a component's own altrange gates a
    /// caller-supplied altrange during containment queries.
    pub fn merge(&self, other: &AltRange) -> AltRange {
        let lower = self.lower_bound().max(other.lower_bound());
        let upper = self.upper_bound().min(other.upper_bound());

        AltRange {
            lower_alt: if lower == i32::MIN { 0 } else { lower },
            lower_mode: if lower == i32::MIN {
                AltMode::Ignore
            } else {
                AltMode::Floor
            },
            upper_alt: if upper == i32::MAX { 0 } else { upper },
            upper_mode: if upper == i32::MAX {
                AltMode::Unlimited
            } else {
                AltMode::Ceiling
            },
        }
    }

    /// This band as a half-open `IntervalSet<i32>`, e.g. `FL000-FL660`
    /// becomes `[0, 66001)` so that `66000` (the inclusive ceiling) tests
    /// as contained.
    pub fn get_interval(&self) -> IntervalSet<i32> {
        let lower = self.lower_bound();
        let upper = self.upper_bound();
        if lower > upper {
            return IntervalSet::empty();
        }
        let end = if upper == i32::MAX {
            i32::MAX
        } else {
            upper.saturating_add(1)
        };
        IntervalSet::single(lower.max(i32::MIN + 1), end)
    }
}

/// A pair of altitude interval sets, one per direction of travel along a
/// route leg.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BidirAltRange {
    pub forward: IntervalSet<i32>,
    pub backward: IntervalSet<i32>,
}

impl BidirAltRange {
    pub fn new(forward: IntervalSet<i32>, backward: IntervalSet<i32>) -> Self {
        Self { forward, backward }
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            forward: self.forward.union(&other.forward),
            backward: self.backward.union(&other.backward),
        }
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            forward: self.forward.intersection(&other.forward),
            backward: self.backward.intersection(&other.backward),
        }
    }

    pub fn complement(&self, universe_start: i32, universe_end: i32) -> Self {
        Self {
            forward: self.forward.complement(universe_start, universe_end),
            backward: self.backward.complement(universe_start, universe_end),
        }
    }

    /// Exchanges forward and backward.
    pub fn swapdir(&mut self) {
        std::mem::swap(&mut self.forward, &mut self.backward);
    }
}
