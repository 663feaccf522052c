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

//! 128-bit object identity and lazy object references.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 128-bit object identity with a nil sentinel and a total order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct Uuid(uuid::Uuid);

impl Uuid {
    /// The nil UUID, used as the "no point" sentinel throughout the
    /// containment and timetable APIs.
    pub const NIL: Self = Self(uuid::Uuid::nil());

    pub fn new_v4() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Returns one of the four 32-bit words making up the UUID, used by the
    /// AUP store's `(uuid0..uuid3)` key columns.
    pub fn word(&self, index: usize) -> u32 {
        let bytes = self.0.as_bytes();
        let start = index * 4;
        u32::from_be_bytes(bytes[start..start + 4].try_into().unwrap())
    }

    pub fn from_words(w0: u32, w1: u32, w2: u32, w3: u32) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&w0.to_be_bytes());
        bytes[4..8].copy_from_slice(&w1.to_be_bytes());
        bytes[8..12].copy_from_slice(&w2.to_be_bytes());
        bytes[12..16].copy_from_slice(&w3.to_be_bytes());
        Self(uuid::Uuid::from_bytes(bytes))
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for Uuid {
    fn from(u: uuid::Uuid) -> Self {
        Self(u)
    }
}

/// A lazy reference to an `Object`.
///
/// Equality and ordering are by UUID only; the identity of the cached
/// pointer is irrelevant — two links naming the same object compare equal
/// whether or not either has been resolved. Unresolved links are permitted;
/// a [`LinkLoader`](crate::collab::LinkLoader) populates the cache
/// breadth-first to a requested depth.
#[derive(Clone, Debug, Default)]
pub struct Link<T> {
    uuid: Uuid,
    cached: RefCell<Option<Rc<T>>>,
}

impl<T> Link<T> {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            cached: RefCell::new(None),
        }
    }

    pub fn nil() -> Self {
        Self::new(Uuid::NIL)
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn is_nil(&self) -> bool {
        self.uuid.is_nil()
    }

    /// Returns the cached target, if any has been resolved.
    pub fn cached(&self) -> Option<Rc<T>> {
        self.cached.borrow().clone()
    }

    /// Populates the cache. Called by a `LinkLoader` during resolution.
    pub fn resolve(&self, target: Rc<T>) {
        *self.cached.borrow_mut() = Some(target);
    }

    pub fn is_resolved(&self) -> bool {
        self.cached.borrow().is_some()
    }
}

impl<T> PartialEq for Link<T> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<T> Eq for Link<T> {}

impl<T> PartialOrd for Link<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Link<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.uuid.cmp(&other.uuid)
    }
}

impl<T> From<Uuid> for Link<T> {
    fn from(uuid: Uuid) -> Self {
        Self::new(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_equality_is_by_uuid_only() {
        let uuid = Uuid::new_v4();
        let a: Link<u32> = Link::new(uuid);
        let b: Link<u32> = Link::new(uuid);
        b.resolve(Rc::new(42));

        assert_eq!(a, b);
        assert!(a.cached().is_none());
        assert_eq!(b.cached().map(|r| *r), Some(42));
    }

    #[test]
    fn nil_link_is_nil() {
        let link: Link<u32> = Link::nil();
        assert!(link.is_nil());
    }

    #[test]
    fn uuid_words_round_trip() {
        let uuid = Uuid::new_v4();
        let words: Vec<u32> = (0..4).map(|i| uuid.word(i)).collect();
        let rebuilt = Uuid::from_words(words[0], words[1], words[2], words[3]);
        assert_eq!(uuid, rebuilt);
    }
}
