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

/// Node abstraction: the Ethereum-compatible JSON-RPC endpoint serving the governor contract's
/// event logs.
#[trait_variant::make(Send)]
pub trait Node
where
    Self: Clone + Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    /// The number of the current chain head.
    async fn latest_block_number(&self) -> Result<u64, Self::Error>;

    /// All `ProposalCreated` events emitted in the inclusive block range.
    async fn proposal_created_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawProposalEvent>, Self::Error>;

    /// All `VoteCast` events emitted in the inclusive block range.
    async fn vote_cast_events(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawVoteEvent>, Self::Error>;
}

/// A `ProposalCreated` event as emitted on chain, together with its block data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProposalEvent {
    /// Decimal representation of the proposal id, if the event carries one.
    pub proposal_id: Option<String>,
    pub proposer: String,
    pub description: String,
    pub block_number: u64,
    /// Block timestamp in seconds since the Unix epoch.
    pub timestamp: u64,
}

/// A `VoteCast` event as emitted on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVoteEvent {
    /// Decimal representation of the referenced proposal id, if the event carries one.
    pub proposal_id: Option<String>,
    pub voter: Option<String>,
    pub support: i64,
    /// Decimal representation of the 18-decimal fixed-point weight.
    pub weight: String,
    pub block_number: u64,
}
