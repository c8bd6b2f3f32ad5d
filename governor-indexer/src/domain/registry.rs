// This file is part of governor-indexer.
// Copyright (C) 2025 Midnight Foundation
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error as StdError;

/// Registry abstraction: the remote HTTP directory of participants.
#[trait_variant::make(Send)]
pub trait Registry
where
    Self: Clone + Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    /// Fetch the full registry snapshot. Fails as a whole if the payload cannot be obtained or is
    /// not a sequence of records.
    async fn fetch_records(&self) -> Result<Vec<RawRegistryRecord>, Self::Error>;
}

/// A registry record as delivered by the remote registry, with numeric and boolean fields already
/// coerced. The address is neither validated nor normalized yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRegistryRecord {
    pub eth_address: Option<String>,
    pub total_stake: f64,
    pub reward_cut: f64,
    pub fee_cut: f64,
    pub activation_status: bool,
    pub name: String,
    pub service_uri: String,
    pub avatar: String,
}
