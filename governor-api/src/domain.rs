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

pub mod storage;

use crate::domain::storage::Storage;
use fastrace::trace;
use std::error::Error as StdError;

#[trait_variant::make(Send)]
pub trait Api
where
    Self: 'static,
{
    type Error: StdError + Send + Sync + 'static;

    async fn serve(self) -> Result<(), Self::Error>;
}

/// A stored proposal with its votes.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub proposer_address: String,
    /// Empty if the proposer is unknown to the registry.
    pub proposer_name: String,
    pub proposer_avatar: String,
    pub created_at: i64,
    pub votes: Vec<Vote>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    pub voter_address: String,
    /// Empty if the voter is unknown to the registry.
    pub voter_name: String,
    pub voter_avatar: String,
    /// One of `Yes`, `No` or `Abstain`.
    pub support: String,
    pub stake_amount: f64,
}

/// List all proposals, newest first, each with its votes ordered by descending stake. Ties keep
/// their stored order.
#[trace]
pub async fn list_proposals(storage: &impl Storage) -> Result<Vec<Proposal>, sqlx::Error> {
    let mut proposals = storage.get_proposals().await?;

    for proposal in proposals.iter_mut() {
        let mut votes = storage.get_votes_by_proposal_id(&proposal.id).await?;
        votes.sort_by(|a, b| b.stake_amount.total_cmp(&a.stake_amount));
        proposal.votes = votes;
    }

    proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(proposals)
}
