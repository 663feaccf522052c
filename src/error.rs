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

use std::fmt;

use crate::uuid::Uuid;

/// Error taxonomy for the temporal object, airspace, timetable and AUP
/// subsystems.
///
/// Read-only queries (containment, timetable evaluation) never produce an
/// `Error`; they degrade to an empty result or the invalid sentinel instead.
/// Only mutating operations — `recompute`, AUP ingest resolution and the AUP
/// store's persistence boundary — return `Result<_, Error>`.
#[derive(Debug)]
pub enum Error {
    /// A [`Link`](crate::object::Link) whose target is not present in the
    /// object database.
    LinkUnresolved(Uuid),

    /// A structural invariant was violated (out-of-range `PointLink`
    /// indices, an invalid operator enum, a CDR number outside `{1,2,3}`).
    InvariantViolated(&'static str),

    /// Source geometry self-intersects and could not be repaired.
    GeometryInvalid(&'static str),

    /// Malformed input encountered while parsing an enum, number or
    /// coordinate during ingestion.
    ParseError(String),

    /// The AUP store's persistence boundary failed; the enclosing
    /// transaction is rolled back.
    #[cfg(feature = "sqlite")]
    Persistence(rusqlite::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkUnresolved(uuid) => write!(f, "unresolved link to object {uuid}"),
            Self::InvariantViolated(what) => write!(f, "invariant violated: {what}"),
            Self::GeometryInvalid(what) => write!(f, "invalid geometry: {what}"),
            Self::ParseError(what) => write!(f, "parse error: {what}"),
            #[cfg(feature = "sqlite")]
            Self::Persistence(e) => write!(f, "AUP store error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Persistence(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Self::Persistence(e)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite_migration::Error> for Error {
    fn from(e: rusqlite_migration::Error) -> Self {
        Self::ParseError(e.to_string())
    }
}
