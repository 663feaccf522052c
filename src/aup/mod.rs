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

//! CDR/RSA availability records and their persistent, temporally-sliced
//! store.

pub mod cache;
#[cfg(feature = "sqlite")]
pub mod hibernate;
pub mod ingest;
pub mod model;
#[cfg(feature = "sqlite")]
pub mod store;

pub use cache::ConditionalAvailability;
pub use model::{
    Activation, ActivationStatus, Availability, AupCdr, AupRecord, AupRsa, Direction,
};
#[cfg(feature = "sqlite")]
pub use store::{AupStore, AupStoreConfig};
